//! Tick Driver
//!
//! Runs the coordinator at a fixed frame rate. Everything that can block
//! (synthesis, playback, webhook calls) happens on a separate speech worker
//! task; the tick loop only ever renders frames and applies commands.
//!
//! # Loop
//!
//! ```text
//! select! (biased)
//!   ├─ command from a RobotHandle   → applied before the next frame
//!   ├─ event from the speech worker → mouth on/off, status text
//!   └─ interval tick                → coordinator.tick(status)
//! ```
//!
//! Speech jobs queue up and run one at a time, in order. The `speech`
//! event for a job is posted on its own task once playback ends.
//!
//! # Shutdown
//!
//! [`RobotHandle::shutdown`] clears the shared running flag and posts a
//! wake-up command. The loop notices within one tick, aborts the speech
//! worker (which kills any running player) and shuts the coordinator down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::coordinator::{ModeCoordinator, SpeechTask};
use crate::display::FaceDisplay;
use crate::error::{RobotError, VoiceError};
use crate::mode::OperationalMode;
use crate::notifier::WorkflowNotifier;
use crate::voice::VoiceAdapter;

/// Status line shown while idle
pub const DEFAULT_STATUS: &str = "Ready";

/// Status line shown while a speech job runs
pub const SPEAKING_STATUS: &str = "Speaking...";

const COMMAND_CAPACITY: usize = 64;
const SPEECH_QUEUE_CAPACITY: usize = 16;

/// Requests accepted by the driver
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RobotCommand {
    /// Switch operational mode
    SetMode(OperationalMode),
    /// Queue an utterance
    Speak {
        /// Text to speak
        text: String,
        /// Voice override
        voice: Option<String>,
    },
    /// Replace the idle status line
    SetStatus(String),
    /// Stop the loop
    Shutdown,
}

/// Progress reports from the speech worker
#[derive(Debug)]
pub enum SpeechEvent {
    /// A job started playing
    Started {
        /// Text being spoken
        text: String,
    },
    /// Playback of a job ended
    Finished {
        /// Text that was spoken
        text: String,
        /// Voice adapter outcome
        result: Result<(), VoiceError>,
    },
}

/// Cloneable handle for steering a running driver
#[derive(Clone, Debug)]
pub struct RobotHandle {
    tx: mpsc::Sender<RobotCommand>,
    running: Arc<AtomicBool>,
}

impl RobotHandle {
    async fn send(&self, command: RobotCommand) -> Result<(), RobotError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| RobotError::DriverStopped)
    }

    /// Switch mode before the next frame
    ///
    /// # Errors
    ///
    /// [`RobotError::DriverStopped`] once the driver has exited.
    pub async fn set_mode(&self, mode: OperationalMode) -> Result<(), RobotError> {
        self.send(RobotCommand::SetMode(mode)).await
    }

    /// Queue an utterance
    ///
    /// # Errors
    ///
    /// [`RobotError::DriverStopped`] once the driver has exited.
    pub async fn speak(
        &self,
        text: impl Into<String>,
        voice: Option<String>,
    ) -> Result<(), RobotError> {
        self.send(RobotCommand::Speak {
            text: text.into(),
            voice,
        })
        .await
    }

    /// Replace the idle status line
    ///
    /// # Errors
    ///
    /// [`RobotError::DriverStopped`] once the driver has exited.
    pub async fn set_status(&self, status: impl Into<String>) -> Result<(), RobotError> {
        self.send(RobotCommand::SetStatus(status.into())).await
    }

    /// Forward an already-built command
    ///
    /// # Errors
    ///
    /// [`RobotError::DriverStopped`] once the driver has exited.
    pub async fn command(&self, command: RobotCommand) -> Result<(), RobotError> {
        if command == RobotCommand::Shutdown {
            self.shutdown();
            return Ok(());
        }
        self.send(command).await
    }

    /// Ask the driver to stop; it exits within one tick
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        // Wake the loop early; the flag alone is enough if the queue is full
        let _ = self.tx.try_send(RobotCommand::Shutdown);
    }

    /// Whether the driver is still accepting work
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Fixed-tick scheduler owning the coordinator
pub struct TickDriver<V: VoiceAdapter, N: WorkflowNotifier, D: FaceDisplay> {
    coordinator: ModeCoordinator<V, N, D>,
    commands_tx: mpsc::Sender<RobotCommand>,
    commands_rx: mpsc::Receiver<RobotCommand>,
    running: Arc<AtomicBool>,
    frame_duration: Duration,
    status: String,
    speaking: bool,
}

impl<V, N, D> TickDriver<V, N, D>
where
    V: VoiceAdapter + 'static,
    N: WorkflowNotifier + 'static,
    D: FaceDisplay,
{
    /// Drive `coordinator` with one tick per `frame_duration`
    pub fn new(coordinator: ModeCoordinator<V, N, D>, frame_duration: Duration) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
        Self {
            coordinator,
            commands_tx,
            commands_rx,
            running: Arc::new(AtomicBool::new(true)),
            frame_duration: frame_duration.max(Duration::from_millis(1)),
            status: DEFAULT_STATUS.to_string(),
            speaking: false,
        }
    }

    /// A handle for sending commands
    #[must_use]
    pub fn handle(&self) -> RobotHandle {
        RobotHandle {
            tx: self.commands_tx.clone(),
            running: Arc::clone(&self.running),
        }
    }

    /// The driven coordinator
    #[must_use]
    pub fn coordinator(&self) -> &ModeCoordinator<V, N, D> {
        &self.coordinator
    }

    /// Mutable access before the loop starts (start mode, status)
    pub fn coordinator_mut(&mut self) -> &mut ModeCoordinator<V, N, D> {
        &mut self.coordinator
    }

    fn status_text(&self) -> &str {
        if self.speaking {
            SPEAKING_STATUS
        } else {
            &self.status
        }
    }

    /// Run until shut down, then return the shut-down coordinator
    pub async fn run(mut self) -> ModeCoordinator<V, N, D> {
        let (jobs_tx, jobs_rx) = mpsc::channel(SPEECH_QUEUE_CAPACITY);
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let worker = spawn_speech_worker(jobs_rx, events_tx);

        let mut ticker = tokio::time::interval(self.frame_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            frame = ?self.frame_duration,
            mode = %self.coordinator.mode(),
            "Tick driver started"
        );

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                biased;

                Some(command) = self.commands_rx.recv() => {
                    self.apply(command, &jobs_tx);
                }

                Some(event) = events_rx.recv() => {
                    self.on_speech_event(event);
                }

                _ = ticker.tick() => {
                    if self.running.load(Ordering::SeqCst) {
                        let status = self.status_text().to_string();
                        self.coordinator.tick(&status);
                    }
                }
            }
        }

        tracing::info!("Tick driver stopping");
        worker.abort();
        // Wait for the abort so the player process is gone before shutdown
        let _ = worker.await;

        if self.speaking {
            self.speaking = false;
            self.coordinator.set_speaking(false);
        }
        self.coordinator.shutdown().await;
        self.coordinator
    }

    fn apply(&mut self, command: RobotCommand, jobs: &mpsc::Sender<SpeechTask<V, N>>) {
        match command {
            RobotCommand::SetMode(mode) => self.coordinator.set_mode(mode),
            RobotCommand::Speak { text, voice } => {
                let task = self.coordinator.speech_task(text, voice.as_deref());
                if let Err(e) = jobs.try_send(task) {
                    tracing::warn!(error = %e, "Speech queue full, utterance dropped");
                }
            }
            RobotCommand::SetStatus(status) => self.status = status,
            RobotCommand::Shutdown => self.running.store(false, Ordering::SeqCst),
        }
    }

    fn on_speech_event(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::Started { text } => {
                tracing::debug!(text = %text, "Speech started");
                self.speaking = true;
                self.coordinator.set_speaking(true);
            }
            SpeechEvent::Finished { text, result } => {
                match result {
                    Ok(()) => tracing::debug!(text = %text, "Speech finished"),
                    Err(e) => tracing::error!(text = %text, error = %e, "Speech failed"),
                }
                self.speaking = false;
                self.coordinator.set_speaking(false);
            }
        }
    }
}

/// Run queued speech jobs one at a time
fn spawn_speech_worker<V, N>(
    mut jobs: mpsc::Receiver<SpeechTask<V, N>>,
    events: mpsc::UnboundedSender<SpeechEvent>,
) -> JoinHandle<()>
where
    V: VoiceAdapter + 'static,
    N: WorkflowNotifier + 'static,
{
    tokio::spawn(async move {
        while let Some(task) = jobs.recv().await {
            let text = task.text().to_string();
            if events.send(SpeechEvent::Started { text: text.clone() }).is_err() {
                break;
            }
            let result = task.play().await;
            if events.send(SpeechEvent::Finished { text, result }).is_err() {
                break;
            }
            // The mouth stops with the audio; the next job never waits on a webhook
            tokio::spawn(task.log());
        }
    })
}

//! Mode Coordinator - The Robot's Root Service
//!
//! The coordinator owns the operational mode and pushes its consequences
//! (which voice, which theme) to the leaf services it was handed:
//! - a [`VoiceAdapter`] for speech
//! - a [`WorkflowNotifier`] for event logging
//! - a [`FaceDisplay`] for the animated face
//!
//! It never constructs those services itself, so tests can hand it doubles.
//!
//! # Mode Table
//!
//! | Mode   | Voice        | Theme     |
//! |--------|--------------|-----------|
//! | Kid    | profile.kid  | kid       |
//! | Cyber  | profile.cyber| cyber     |
//! | Locked | unchanged    | unchanged |
//!
//! # Speech
//!
//! Speaking is packaged as a [`SpeechTask`] that owns everything it needs,
//! so the tick driver can run it on a worker while frames keep rendering.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::display::FaceDisplay;
use crate::error::{RobotError, VoiceError};
use crate::mode::{OperationalMode, VoiceProfile};
use crate::notifier::WorkflowNotifier;
use crate::theme::ThemeKey;
use crate::voice::VoiceAdapter;

/// Event type logged after every utterance
pub const SPEECH_EVENT: &str = "speech";

/// Snapshot of the robot for status queries
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RobotStatus {
    /// Robot name
    pub robot: String,
    /// Current mode
    pub mode: OperationalMode,
    /// Human description of the mode
    pub mode_description: String,
    /// Currently selected voice
    pub voice: String,
    /// Active theme
    pub theme: ThemeKey,
    /// Whether the face is being drawn
    pub display_enabled: bool,
    /// Whether `initialize` succeeded and `shutdown` has not run
    pub running: bool,
    /// Seconds since the coordinator was created
    pub uptime_secs: u64,
}

/// One utterance, detached from the coordinator
///
/// The voice is resolved when the task is created, so a mode switch while
/// the task waits in a queue does not change who says it.
pub struct SpeechTask<V: VoiceAdapter, N: WorkflowNotifier> {
    voice: Arc<V>,
    notifier: Arc<N>,
    text: String,
    voice_id: String,
    mode: OperationalMode,
}

impl<V: VoiceAdapter, N: WorkflowNotifier> SpeechTask<V, N> {
    /// Text to be spoken
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Voice that will speak
    #[must_use]
    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    /// Mode at the time the task was created
    #[must_use]
    pub fn mode(&self) -> OperationalMode {
        self.mode
    }

    /// Speak, then log a `speech` event whatever the outcome
    ///
    /// # Errors
    ///
    /// Returns the voice adapter's error. Notification failures are never
    /// returned.
    pub async fn run(self) -> Result<(), VoiceError> {
        let result = self.play().await;
        self.log().await;
        result
    }

    /// Synthesize and play; returns when playback has ended
    ///
    /// # Errors
    ///
    /// Synthesis and playback errors from the voice adapter.
    pub async fn play(&self) -> Result<(), VoiceError> {
        let result = self.voice.speak(&self.text, Some(&self.voice_id)).await;
        if let Err(ref e) = result {
            tracing::warn!(voice = %self.voice_id, error = %e, "Speech failed");
        }
        result
    }

    /// Post the `speech` event for this utterance
    pub async fn log(self) {
        self.notifier
            .notify(
                SPEECH_EVENT,
                self.mode,
                serde_json::json!({ "text": self.text, "voice": self.voice_id }),
            )
            .await;
    }
}

/// The mode coordinator
pub struct ModeCoordinator<V: VoiceAdapter, N: WorkflowNotifier, D: FaceDisplay> {
    voice: Arc<V>,
    notifier: Arc<N>,
    display: D,
    profile: VoiceProfile,
    robot_name: String,
    mode: OperationalMode,
    theme: ThemeKey,
    running: bool,
    shut_down: bool,
    started: Instant,
}

impl<V, N, D> ModeCoordinator<V, N, D>
where
    V: VoiceAdapter + 'static,
    N: WorkflowNotifier + 'static,
    D: FaceDisplay,
{
    /// Create a coordinator over constructed services
    ///
    /// Starts in [`OperationalMode::Locked`] with the kid theme.
    pub fn new(
        voice: Arc<V>,
        notifier: Arc<N>,
        display: D,
        profile: VoiceProfile,
        robot_name: impl Into<String>,
    ) -> Self {
        Self {
            voice,
            notifier,
            display,
            profile,
            robot_name: robot_name.into(),
            mode: OperationalMode::default(),
            theme: ThemeKey::default(),
            running: false,
            shut_down: false,
            started: Instant::now(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Bring up voice, display and notifier, in that order
    ///
    /// # Errors
    ///
    /// [`RobotError::Initialization`] if the voice adapter fails. A display
    /// failure only leaves the robot headless; an unreachable notifier is
    /// only logged, and a disabled one is not probed.
    pub async fn initialize(&mut self) -> Result<(), RobotError> {
        tracing::info!(robot = %self.robot_name, "Initializing robot services");

        self.voice
            .initialize()
            .await
            .map_err(|e| RobotError::Initialization {
                service: format!("voice ({})", self.voice.name()),
                reason: e.to_string(),
            })?;

        match self.display.initialize() {
            Ok(()) => self.display.set_theme(self.theme),
            Err(e) => tracing::warn!(error = %e, "Display unavailable, continuing headless"),
        }

        if !self.notifier.is_enabled() {
            tracing::debug!("Workflow notifier disabled, events are not logged");
        } else if !self.notifier.check_connection().await {
            tracing::warn!("Workflow notifier unreachable, events may be lost");
        }

        self.running = true;
        self.shut_down = false;
        tracing::info!(mode = %self.mode, "Robot services ready");
        Ok(())
    }

    /// Release display, then voice; later calls do nothing
    pub async fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.running = false;

        tracing::info!("Shutting down robot services");
        self.display.shutdown();
        self.voice.shutdown().await;
    }

    // ========================================================================
    // Modes
    // ========================================================================

    /// Switch to `target`, updating voice and theme per the mode table
    pub fn set_mode(&mut self, target: OperationalMode) {
        if let Some(voice) = self.profile.voice_for(target) {
            self.voice.select_voice(voice);
        }
        if let Some(theme) = target.theme() {
            self.theme = theme;
            self.display.set_theme(theme);
        }

        let previous = std::mem::replace(&mut self.mode, target);
        tracing::info!(from = %previous, to = %target, "Mode set");
    }

    /// Current mode
    #[must_use]
    pub fn mode(&self) -> OperationalMode {
        self.mode
    }

    /// Current theme
    #[must_use]
    pub fn theme(&self) -> ThemeKey {
        self.theme
    }

    // ========================================================================
    // Speech
    // ========================================================================

    /// Package an utterance with the override or the current voice
    pub fn speech_task(
        &self,
        text: impl Into<String>,
        voice_override: Option<&str>,
    ) -> SpeechTask<V, N> {
        SpeechTask {
            voice: Arc::clone(&self.voice),
            notifier: Arc::clone(&self.notifier),
            text: text.into(),
            voice_id: voice_override.map_or_else(|| self.voice.current_voice(), str::to_string),
            mode: self.mode,
        }
    }

    /// Speak with the current voice and wait for playback
    ///
    /// # Errors
    ///
    /// Synthesis and playback errors from the voice adapter.
    pub async fn speak(&self, text: &str) -> Result<(), VoiceError> {
        self.speech_task(text, None).run().await
    }

    /// Speak with an explicit voice and wait for playback
    ///
    /// # Errors
    ///
    /// Synthesis and playback errors from the voice adapter.
    pub async fn speak_with_voice(&self, text: &str, voice: &str) -> Result<(), VoiceError> {
        self.speech_task(text, Some(voice)).run().await
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Render one frame; does nothing while headless
    pub fn tick(&mut self, status: &str) {
        if self.display.is_enabled() {
            self.display.render_frame(self.mode, status);
        }
    }

    /// Toggle the mouth animation
    pub fn set_speaking(&mut self, active: bool) {
        self.display.set_speaking(active);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Whether initialized and not shut down
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The voice adapter
    #[must_use]
    pub fn voice(&self) -> &Arc<V> {
        &self.voice
    }

    /// The notifier
    #[must_use]
    pub fn notifier(&self) -> &Arc<N> {
        &self.notifier
    }

    /// The display
    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Status snapshot
    #[must_use]
    pub fn status(&self) -> RobotStatus {
        RobotStatus {
            robot: self.robot_name.clone(),
            mode: self.mode,
            mode_description: self.mode.description().to_string(),
            voice: self.voice.current_voice(),
            theme: self.theme,
            display_enabled: self.display.is_enabled(),
            running: self.running,
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}

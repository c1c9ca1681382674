//! Shared test doubles for the coordinator and driver suites

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use robot_core::{
    DisplayError, FaceDisplay, ModeCoordinator, OperationalMode, ThemeKey, VoiceAdapter,
    VoiceError, VoiceProfile, WorkflowNotifier,
};

/// Ordered record of lifecycle calls across all doubles
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

// ============================================================================
// Voice
// ============================================================================

/// Voice adapter that records utterances instead of playing them
pub struct MockVoice {
    current: Mutex<String>,
    pub spoken: Mutex<Vec<(String, String)>>,
    pub fail_init: bool,
    pub fail_speak: AtomicBool,
    pub init_calls: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// When set, each `speak` waits for one permit
    gate: Option<Arc<Notify>>,
    journal: Journal,
}

impl MockVoice {
    pub fn new(journal: Journal) -> Self {
        Self {
            current: Mutex::new("Joanna".to_string()),
            spoken: Mutex::new(Vec::new()),
            fail_init: false,
            fail_speak: AtomicBool::new(false),
            init_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gate: None,
            journal,
        }
    }

    pub fn failing_init(journal: Journal) -> Self {
        Self {
            fail_init: true,
            ..Self::new(journal)
        }
    }

    pub fn gated(journal: Journal, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(journal)
        }
    }

    pub fn spoken(&self) -> Vec<(String, String)> {
        self.spoken.lock().clone()
    }
}

#[async_trait]
impl VoiceAdapter for MockVoice {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn initialize(&self) -> Result<(), VoiceError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push("voice.initialize".into());
        if self.fail_init {
            Err(VoiceError::Initialization("no credentials".into()))
        } else {
            Ok(())
        }
    }

    fn select_voice(&self, voice_id: &str) {
        *self.current.lock() = voice_id.to_string();
    }

    fn current_voice(&self) -> String {
        self.current.lock().clone()
    }

    async fn speak(&self, text: &str, voice_override: Option<&str>) -> Result<(), VoiceError> {
        let voice = voice_override.map_or_else(|| self.current_voice(), str::to_string);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }

        self.spoken.lock().push((text.to_string(), voice.clone()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_speak.load(Ordering::SeqCst) {
            Err(VoiceError::Playback("player exited with 1".into()))
        } else {
            Ok(())
        }
    }

    async fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push("voice.shutdown".into());
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Notifier that records events
#[derive(Default)]
pub struct MockNotifier {
    pub events: Mutex<Vec<(String, OperationalMode, Value)>>,
    pub probes: AtomicUsize,
    pub reachable: bool,
    pub disabled: bool,
    /// How long each `notify` takes, like a slow webhook
    pub delay: Duration,
}

impl MockNotifier {
    pub fn events(&self) -> Vec<(String, OperationalMode, Value)> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl WorkflowNotifier for MockNotifier {
    fn is_enabled(&self) -> bool {
        !self.disabled
    }

    async fn check_connection(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable
    }

    async fn notify(&self, event_type: &str, mode: OperationalMode, data: Value) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.events.lock().push((event_type.to_string(), mode, data));
    }
}

// ============================================================================
// Display
// ============================================================================

/// Everything a [`MockDisplay`] was asked to do
#[derive(Debug, Default)]
pub struct DisplayLog {
    pub enabled: bool,
    pub theme: Option<ThemeKey>,
    pub themes: Vec<ThemeKey>,
    pub speaking: bool,
    pub speaking_changes: Vec<bool>,
    /// (mode, theme at render time, status, speaking)
    pub frames: Vec<(OperationalMode, Option<ThemeKey>, String, bool)>,
    pub shutdown_calls: usize,
}

/// Display double whose log outlives the coordinator that owns it
pub struct MockDisplay {
    pub log: Arc<Mutex<DisplayLog>>,
    fail_init: bool,
    journal: Journal,
}

impl MockDisplay {
    pub fn new(journal: Journal) -> (Self, Arc<Mutex<DisplayLog>>) {
        let log = Arc::new(Mutex::new(DisplayLog::default()));
        (
            Self {
                log: Arc::clone(&log),
                fail_init: false,
                journal,
            },
            log,
        )
    }

    pub fn unavailable(journal: Journal) -> (Self, Arc<Mutex<DisplayLog>>) {
        let (mut display, log) = Self::new(journal);
        display.fail_init = true;
        (display, log)
    }
}

impl FaceDisplay for MockDisplay {
    fn initialize(&mut self) -> Result<(), DisplayError> {
        self.journal.lock().push("display.initialize".into());
        if self.fail_init {
            return Err(DisplayError::SurfaceUnavailable("no terminal".into()));
        }
        self.log.lock().enabled = true;
        Ok(())
    }

    fn set_theme(&mut self, theme: ThemeKey) {
        let mut log = self.log.lock();
        log.theme = Some(theme);
        log.themes.push(theme);
    }

    fn set_speaking(&mut self, active: bool) {
        let mut log = self.log.lock();
        log.speaking = active;
        log.speaking_changes.push(active);
    }

    fn render_frame(&mut self, mode: OperationalMode, status: &str) {
        let mut log = self.log.lock();
        if !log.enabled {
            return;
        }
        let frame = (mode, log.theme, status.to_string(), log.speaking);
        log.frames.push(frame);
    }

    fn shutdown(&mut self) {
        self.journal.lock().push("display.shutdown".into());
        let mut log = self.log.lock();
        log.enabled = false;
        log.shutdown_calls += 1;
    }

    fn is_enabled(&self) -> bool {
        self.log.lock().enabled
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub type TestCoordinator = ModeCoordinator<MockVoice, MockNotifier, MockDisplay>;

/// Everything needed to assert on a coordinator built from doubles
pub struct Fixture {
    pub coordinator: TestCoordinator,
    pub voice: Arc<MockVoice>,
    pub notifier: Arc<MockNotifier>,
    pub display: Arc<Mutex<DisplayLog>>,
    pub journal: Journal,
}

pub fn fixture_with(
    voice: MockVoice,
    display: MockDisplay,
    log: Arc<Mutex<DisplayLog>>,
    journal: Journal,
) -> Fixture {
    fixture_with_notifier(
        voice,
        MockNotifier {
            reachable: true,
            ..MockNotifier::default()
        },
        display,
        log,
        journal,
    )
}

pub fn fixture_with_notifier(
    voice: MockVoice,
    notifier: MockNotifier,
    display: MockDisplay,
    log: Arc<Mutex<DisplayLog>>,
    journal: Journal,
) -> Fixture {
    let voice = Arc::new(voice);
    let notifier = Arc::new(notifier);
    let coordinator = ModeCoordinator::new(
        Arc::clone(&voice),
        Arc::clone(&notifier),
        display,
        VoiceProfile::default(),
        "Kali",
    );
    Fixture {
        coordinator,
        voice,
        notifier,
        display: log,
        journal,
    }
}

pub fn fixture() -> Fixture {
    let journal = journal();
    let voice = MockVoice::new(Arc::clone(&journal));
    let (display, log) = MockDisplay::new(Arc::clone(&journal));
    fixture_with(voice, display, log, journal)
}

/// Poll `condition` until it holds or `timeout` passes
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    condition()
}

//! TOML Configuration File Support
//!
//! Configuration for the robot is loaded once at start-up from a TOML file
//! at `~/.config/kali-robot/robot.toml` and then overridden by environment
//! variables. After loading it is never mutated.
//!
//! # Configuration Priority
//!
//! Values are applied with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! The binaries only pick which file is read (`--config`).
//!
//! # Example Configuration
//!
//! ```toml
//! [voice]
//! region = "us-east-1"
//! kid_voice = "Joanna"
//! cyber_voice = "Matthew"
//! player = "mpg123"
//! output_device = "hw:0,0"
//!
//! [notifier]
//! base_url = "https://automation.tampadynamics.com"
//! workflow = "kali-logger"
//! timeout_secs = 5
//!
//! [display]
//! fps = 60
//!
//! [logging]
//! level = "info"
//!
//! [[connectivity.targets]]
//! name = "Tool server"
//! url = "https://api.nxthreat.io"
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connectivity::ConnectivityTarget;
use crate::mode::VoiceProfile;

/// Default workflow automation host
pub const DEFAULT_NOTIFIER_BASE_URL: &str = "https://automation.tampadynamics.com";

/// Highest frame rate the display will run at
pub const MAX_FPS: u32 = 60;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Voice section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceToml {
    /// AWS region of the speech service
    pub region: Option<String>,
    /// Full speech endpoint URL, overriding the regional default
    pub endpoint: Option<String>,
    /// Voice used in kid mode
    pub kid_voice: Option<String>,
    /// Voice used in cyber mode
    pub cyber_voice: Option<String>,
    /// Audio player executable
    pub player: Option<String>,
    /// Output device passed to the player
    pub output_device: Option<String>,
    /// Scratch directory for synthesized audio
    pub audio_dir: Option<PathBuf>,
    /// Synthesis request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Notifier section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierToml {
    /// Automation host; an empty string disables notifications
    pub base_url: Option<String>,
    /// Workflow that receives robot events
    pub workflow: Option<String>,
    /// Robot name sent with every event
    pub robot_name: Option<String>,
    /// Bearer token for the webhook
    pub webhook_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Display section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Target frame rate
    pub fps: Option<u32>,
}

/// Logging section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingToml {
    /// Filter directive (`info`, `debug`, `robot_core=trace`, ...)
    pub level: Option<String>,
    /// Log file used while the terminal face owns the screen
    pub file: Option<PathBuf>,
}

/// Connectivity section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityToml {
    /// Extra hosts checked by `kali-check connectivity`
    pub targets: Vec<ConnectivityTarget>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotToml {
    /// Voice configuration section
    pub voice: VoiceToml,
    /// Notifier configuration section
    pub notifier: NotifierToml,
    /// Display configuration section
    pub display: DisplayToml,
    /// Logging configuration section
    pub logging: LoggingToml,
    /// Connectivity configuration section
    pub connectivity: ConnectivityToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Static AWS credentials taken from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Session token for temporary credentials
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Speech synthesis and playback settings
#[derive(Clone, Debug)]
pub struct VoiceConfig {
    /// AWS region of the speech service
    pub region: String,
    /// Endpoint override (`None` = regional default)
    pub endpoint: Option<String>,
    /// Voice ids per speaking mode
    pub profile: VoiceProfile,
    /// Audio player executable
    pub player: String,
    /// Output device passed to the player
    pub output_device: String,
    /// Scratch directory for synthesized audio
    pub audio_dir: PathBuf,
    /// Synthesis request timeout
    pub timeout: Duration,
    /// Credentials (`None` until provided by the environment)
    pub credentials: Option<AwsCredentials>,
}

impl VoiceConfig {
    /// Speech endpoint for the configured region unless overridden
    #[must_use]
    pub fn speech_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://polly.{}.amazonaws.com/v1/speech", self.region))
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            profile: VoiceProfile::default(),
            player: "mpg123".to_string(),
            output_device: "hw:0,0".to_string(),
            audio_dir: std::env::temp_dir().join("kali-robot").join("audio"),
            timeout: Duration::from_secs(30),
            credentials: None,
        }
    }
}

/// Workflow webhook settings
#[derive(Clone, Debug)]
pub struct NotifierConfig {
    /// Automation host (`None` disables notifications)
    pub base_url: Option<String>,
    /// Workflow that receives robot events
    pub workflow: String,
    /// Robot name sent with every event
    pub robot_name: String,
    /// Bearer token for the webhook
    pub webhook_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_NOTIFIER_BASE_URL.to_string()),
            workflow: "kali-logger".to_string(),
            robot_name: "Kali".to_string(),
            webhook_key: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Face display settings
#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Target frame rate, at most [`MAX_FPS`]
    pub fps: u32,
}

impl DisplayConfig {
    /// Time budget of one frame
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.clamp(1, MAX_FPS)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { fps: MAX_FPS }
    }
}

/// Logging settings
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// `EnvFilter` directive
    pub level: String,
    /// Log file used while the terminal face owns the screen
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: dirs::data_dir().map(|p| p.join("kali-robot").join("kali.log")),
        }
    }
}

/// Resolved robot configuration
///
/// Use [`load_config`] to build it with proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct RobotConfig {
    /// Voice settings
    pub voice: VoiceConfig,
    /// Notifier settings
    pub notifier: NotifierConfig,
    /// Display settings
    pub display: DisplayConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Extra connectivity targets
    pub connectivity_targets: Vec<ConnectivityTarget>,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Source of the highest-priority value applied
    source: ConfigSource,
}

impl RobotConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Log where the values came from
    ///
    /// Loading runs before the subscriber exists, so the binaries call this
    /// once logging is up.
    pub fn log_origin(&self) {
        match self.config_file_path {
            Some(ref path) => tracing::info!(
                path = %path.display(),
                source = %self.source,
                "Loaded configuration from file"
            ),
            None => tracing::info!(source = %self.source, "No config file, using defaults"),
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voice.region.trim().is_empty() {
            return Err(ConfigError::ValidationError("voice.region is empty".into()));
        }
        if self.voice.player.trim().is_empty() {
            return Err(ConfigError::ValidationError("voice.player is empty".into()));
        }
        if self.voice.timeout.is_zero() || self.notifier.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "timeouts must be at least one second".into(),
            ));
        }
        if !(1..=MAX_FPS).contains(&self.display.fps) {
            return Err(ConfigError::ValidationError(format!(
                "display.fps must be between 1 and {MAX_FPS}, got {}",
                self.display.fps
            )));
        }
        if let Some(ref url) = self.notifier.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "notifier.base_url must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/kali-robot/robot.toml` or
/// `~/.config/kali-robot/robot.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kali-robot").join("robot.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the resulting values fail validation. A missing config file is not an
/// error (defaults are used).
pub fn load_config() -> Result<RobotConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<RobotConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with a custom environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<RobotConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RobotConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: RobotToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;
        }
    }

    apply_env_config(&mut config, &env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut RobotConfig, toml: RobotToml) {
    // Voice settings
    if let Some(region) = toml.voice.region {
        config.voice.region = region;
    }
    if toml.voice.endpoint.is_some() {
        config.voice.endpoint = toml.voice.endpoint;
    }
    if let Some(voice) = toml.voice.kid_voice {
        config.voice.profile.kid = voice;
    }
    if let Some(voice) = toml.voice.cyber_voice {
        config.voice.profile.cyber = voice;
    }
    if let Some(player) = toml.voice.player {
        config.voice.player = player;
    }
    if let Some(device) = toml.voice.output_device {
        config.voice.output_device = device;
    }
    if let Some(dir) = toml.voice.audio_dir {
        config.voice.audio_dir = dir;
    }
    if let Some(secs) = toml.voice.timeout_secs {
        config.voice.timeout = Duration::from_secs(secs);
    }

    // Notifier settings
    if let Some(url) = toml.notifier.base_url {
        config.notifier.base_url = non_empty(url);
    }
    if let Some(workflow) = toml.notifier.workflow {
        config.notifier.workflow = workflow;
    }
    if let Some(name) = toml.notifier.robot_name {
        config.notifier.robot_name = name;
    }
    if let Some(key) = toml.notifier.webhook_key {
        config.notifier.webhook_key = non_empty(key);
    }
    if let Some(secs) = toml.notifier.timeout_secs {
        config.notifier.timeout = Duration::from_secs(secs);
    }

    // Display settings
    if let Some(fps) = toml.display.fps {
        config.display.fps = fps;
    }

    // Logging settings
    if let Some(level) = toml.logging.level {
        config.logging.level = level;
    }
    if toml.logging.file.is_some() {
        config.logging.file = toml.logging.file;
    }

    config.connectivity_targets = toml.connectivity.targets;
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut RobotConfig, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // Speech service
    if let Some(region) = env("AWS_DEFAULT_REGION").and_then(non_empty) {
        config.voice.region = region;
        config.source = ConfigSource::Env;
    }
    if let (Some(access_key_id), Some(secret_access_key)) = (
        env("AWS_ACCESS_KEY_ID").and_then(non_empty),
        env("AWS_SECRET_ACCESS_KEY").and_then(non_empty),
    ) {
        config.voice.credentials = Some(AwsCredentials {
            access_key_id,
            secret_access_key,
            session_token: env("AWS_SESSION_TOKEN").and_then(non_empty),
        });
    }
    if let Some(player) = env("KALI_AUDIO_PLAYER").and_then(non_empty) {
        config.voice.player = player;
        config.source = ConfigSource::Env;
    }
    if let Some(device) = env("KALI_AUDIO_DEVICE").and_then(non_empty) {
        config.voice.output_device = device;
        config.source = ConfigSource::Env;
    }

    // Notifier; an explicitly empty base URL disables it
    if let Some(url) = env("KALI_N8N_BASE_URL") {
        config.notifier.base_url = non_empty(url);
        config.source = ConfigSource::Env;
    }
    if let Some(key) = env("N8N_WEBHOOK_KEY").and_then(non_empty) {
        config.notifier.webhook_key = Some(key);
    }

    // Logging: KALI_LOG_LEVEL wins over RUST_LOG
    if let Some(level) = env("KALI_LOG_LEVEL")
        .and_then(non_empty)
        .or_else(|| env("RUST_LOG").and_then(non_empty))
    {
        config.logging.level = level.to_lowercase();
        config.source = ConfigSource::Env;
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

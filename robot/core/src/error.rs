//! Error Types
//!
//! One error enum per concern. Only [`VoiceError`] and [`RobotError`] ever
//! reach a caller: notification and render failures are logged and
//! swallowed where they happen.

use thiserror::Error;

use crate::config::ConfigError;

// ============================================================================
// Voice
// ============================================================================

/// Errors from speech synthesis and playback
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The adapter could not start (missing credentials, bad client config)
    #[error("voice initialization failed: {0}")]
    Initialization(String),

    /// `speak` was called before `initialize`
    #[error("voice adapter is not initialized")]
    NotInitialized,

    /// The synthesis service rejected or failed the request
    #[error("speech synthesis failed for voice {voice}: {reason}")]
    Synthesis {
        /// Voice id that was requested
        voice: String,
        /// Service or transport message
        reason: String,
    },

    /// The audio player could not be started or exited non-zero
    #[error("audio playback failed: {0}")]
    Playback(String),

    /// Scratch file handling failed
    #[error("audio scratch file error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Notifier
// ============================================================================

/// Errors from workflow webhook calls
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport failure or timeout
    #[error("workflow request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with something other than 200
    #[error("workflow endpoint returned HTTP {0}")]
    Status(u16),

    /// A 200 response whose body was not JSON
    #[error("workflow response was not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// No base URL is configured
    #[error("workflow notifier is disabled")]
    Disabled,
}

// ============================================================================
// Display
// ============================================================================

/// Errors from a render surface
#[derive(Debug, Error)]
pub enum DisplayError {
    /// No surface could be acquired (no terminal, no display)
    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Drawing or presenting a frame failed
    #[error("frame render failed: {0}")]
    Render(String),
}

// ============================================================================
// Robot
// ============================================================================

/// Errors surfaced by the coordinator and driver
#[derive(Debug, Error)]
pub enum RobotError {
    /// A required sub-service failed to start
    #[error("{service} failed to initialize: {reason}")]
    Initialization {
        /// Service name
        service: String,
        /// Failure description
        reason: String,
    },

    /// Speech failed
    #[error(transparent)]
    Voice(#[from] VoiceError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The tick driver is no longer accepting commands
    #[error("robot driver has stopped")]
    DriverStopped,
}

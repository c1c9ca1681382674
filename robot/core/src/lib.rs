//! Robot Core - Headless Mode Coordination for the Kali robot
//!
//! This crate holds everything about the robot that does not depend on a
//! screen: the operational modes, the colour themes, the per-frame animation
//! state, the voice adapter, the workflow notifier, and the coordinator that
//! ties them together behind a fixed-tick driver.
//!
//! # Architecture
//!
//! ```text
//!   RobotHandle (commands)                     speech worker
//!          │                                    ▲        │
//!          ▼                               SpeechTask  SpeechEvent
//!   ┌──────────────┐   tick()   ┌─────────────┐  │        │
//!   │  TickDriver  │──────────▶ │ Coordinator │──┘        │
//!   │  (60 Hz)     │◀───────────┼─────────────┼───────────┘
//!   └──────────────┘            │ ┌─────────┐ │
//!                               │ │ Display │ │  (FaceDisplay, drawn by a surface crate)
//!                               │ ├─────────┤ │
//!                               │ │  Voice  │ │──▶ speech API + audio player
//!                               │ ├─────────┤ │
//!                               │ │Notifier │ │──▶ workflow webhook
//!                               │ └─────────┘ │
//!                               └─────────────┘
//! ```
//!
//! # Module Overview
//!
//! - [`mode`]: Operational modes and the mode → voice/theme tables
//! - [`theme`]: Colour palettes per theme
//! - [`animation`]: Blink and mouth animation state
//! - [`display`]: The display boundary the coordinator drives
//! - [`voice`]: Speech synthesis and audio playback
//! - [`notifier`]: Fire-and-forget workflow webhooks
//! - [`coordinator`]: The mode coordinator
//! - [`driver`]: Fixed-tick scheduler and speech worker
//! - [`config`]: TOML + environment configuration
//! - [`connectivity`]: Reachability checks for external services
//!
//! # No UI Dependencies
//!
//! Like the rest of the headless stack, this crate never touches a terminal.
//! Surfaces implement [`display::FaceDisplay`] and are handed to the
//! coordinator from outside.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod display;
pub mod driver;
pub mod error;
pub mod mode;
pub mod notifier;
pub mod theme;
pub mod voice;

// Re-exports for convenience
pub use animation::AnimationState;
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigSource,
    RobotConfig,
};
pub use coordinator::{ModeCoordinator, RobotStatus, SpeechTask};
pub use display::FaceDisplay;
pub use driver::{RobotCommand, RobotHandle, SpeechEvent, TickDriver};
pub use error::{DisplayError, NotifyError, RobotError, VoiceError};
pub use mode::{OperationalMode, ParseModeError, VoiceProfile};
pub use notifier::{WebhookNotifier, WorkflowNotifier};
pub use theme::{Rgb, ThemeKey, ThemePalette};
pub use voice::{
    AudioPlayer, PollySynthesizer, SpeechSynthesizer, SynthesisRequest, VoiceAdapter,
    VoiceService,
};

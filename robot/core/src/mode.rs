//! Operational Modes
//!
//! The robot runs in exactly one of three personas. The mode decides which
//! voice speaks and which theme the face is drawn with; both tables are
//! exhaustive matches so a new mode cannot compile without an entry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::ThemeKey;

/// Robot operational mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalMode {
    /// Educational mode for children
    Kid,
    /// Security testing mode
    Cyber,
    /// Locked / maintenance mode (process start state)
    #[default]
    Locked,
}

impl OperationalMode {
    /// All modes, in display order
    pub const ALL: [Self; 3] = [Self::Kid, Self::Cyber, Self::Locked];

    /// Lowercase wire name (`"kid"`, `"cyber"`, `"locked"`)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kid => "kid",
            Self::Cyber => "cyber",
            Self::Locked => "locked",
        }
    }

    /// Uppercase label for the status bar
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Kid => "KID",
            Self::Cyber => "CYBER",
            Self::Locked => "LOCKED",
        }
    }

    /// Short human description
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Kid => "Educational mode",
            Self::Cyber => "Security testing",
            Self::Locked => "System maintenance",
        }
    }

    /// Theme selected when entering this mode (`None` keeps the current one)
    #[must_use]
    pub fn theme(self) -> Option<ThemeKey> {
        match self {
            Self::Kid => Some(ThemeKey::Kid),
            Self::Cyber => Some(ThemeKey::Cyber),
            Self::Locked => None,
        }
    }
}

impl fmt::Display for OperationalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known mode
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown mode '{0}' (expected kid, cyber or locked)")]
pub struct ParseModeError(pub String);

impl FromStr for OperationalMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kid" => Ok(Self::Kid),
            "cyber" => Ok(Self::Cyber),
            "locked" => Ok(Self::Locked),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

/// Voice ids used by the speaking modes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Voice for [`OperationalMode::Kid`]
    pub kid: String,
    /// Voice for [`OperationalMode::Cyber`]
    pub cyber: String,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            kid: "Joanna".to_string(),
            cyber: "Matthew".to_string(),
        }
    }
}

impl VoiceProfile {
    /// Voice selected when entering `mode` (`None` keeps the current one)
    #[must_use]
    pub fn voice_for(&self, mode: OperationalMode) -> Option<&str> {
        match mode {
            OperationalMode::Kid => Some(&self.kid),
            OperationalMode::Cyber => Some(&self.cyber),
            OperationalMode::Locked => None,
        }
    }
}

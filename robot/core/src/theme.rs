//! Theme Palettes
//!
//! Surface-agnostic colour palettes for the robot face. Surfaces translate
//! [`Rgb`] into their native colour type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Plain 24-bit colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Named theme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKey {
    /// Bright, friendly palette
    #[default]
    Kid,
    /// Dark terminal palette
    Cyber,
}

impl ThemeKey {
    /// Theme name (`"kid"` / `"cyber"`)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kid => "kid",
            Self::Cyber => "cyber",
        }
    }

    /// The immutable palette for this theme
    #[must_use]
    pub fn palette(self) -> &'static ThemePalette {
        match self {
            Self::Kid => &KID_PALETTE,
            Self::Cyber => &CYBER_PALETTE,
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colours used to draw the face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemePalette {
    /// Screen fill
    pub background: Rgb,
    /// Outer eye
    pub eye: Rgb,
    /// Pupil
    pub pupil: Rgb,
    /// Iris, mouth and status bar
    pub accent: Rgb,
}

// ============================================================================
// Palettes
// ============================================================================

/// Sky blue face with white eyes
pub const KID_PALETTE: ThemePalette = ThemePalette {
    background: Rgb(135, 206, 250),
    eye: Rgb(255, 255, 255),
    pupil: Rgb(40, 40, 40),
    accent: Rgb(255, 105, 180),
};

/// Dark gray face with green phosphor eyes
pub const CYBER_PALETTE: ThemePalette = ThemePalette {
    background: Rgb(20, 20, 20),
    eye: Rgb(0, 255, 65),
    pupil: Rgb(0, 40, 10),
    accent: Rgb(0, 200, 255),
};

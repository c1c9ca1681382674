//! Theme and Colors
//!
//! Terminal colours for the robot palettes.

use ratatui::style::Color;
use robot_core::{Rgb, ThemeKey};

/// Eye shine - white dot on every pupil
pub const EYE_SHINE: Color = Color::Rgb(255, 255, 255);

/// Convert a core colour to a terminal colour
#[must_use]
pub fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Resolved terminal colours for one theme
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceColors {
    /// Screen fill
    pub background: Color,
    /// White of the eye
    pub eye: Color,
    /// Pupil
    pub pupil: Color,
    /// Iris, mouth and status bar
    pub accent: Color,
}

impl FaceColors {
    /// Colours for `theme`
    #[must_use]
    pub fn for_theme(theme: ThemeKey) -> Self {
        let palette = theme.palette();
        Self {
            background: color(palette.background),
            eye: color(palette.eye),
            pupil: color(palette.pupil),
            accent: color(palette.accent),
        }
    }
}

//! Display Boundary
//!
//! The coordinator drives the face through [`FaceDisplay`]. Implementations
//! live in surface crates; the coordinator only ever calls these methods
//! from the tick path.

use crate::error::DisplayError;
use crate::mode::OperationalMode;
use crate::theme::ThemeKey;

/// A face that can be themed, animated and drawn once per tick
///
/// Implementations own their render surface and animation state. After a
/// failed [`initialize`](FaceDisplay::initialize) the display is disabled and
/// every other method must be a cheap no-op.
pub trait FaceDisplay: Send {
    /// Acquire the render surface
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::SurfaceUnavailable`] when no surface can be
    /// acquired. The display stays usable in its disabled state.
    fn initialize(&mut self) -> Result<(), DisplayError>;

    /// Switch palettes, effective from the next frame
    fn set_theme(&mut self, theme: ThemeKey);

    /// Toggle the talking mouth, effective from the next frame
    fn set_speaking(&mut self, active: bool);

    /// Advance the animation and present one frame
    ///
    /// Render failures are handled inside; this never fails.
    fn render_frame(&mut self, mode: OperationalMode, status: &str);

    /// Release the surface; safe to call more than once
    fn shutdown(&mut self);

    /// Whether a surface is held
    fn is_enabled(&self) -> bool;
}

impl<D: FaceDisplay + ?Sized> FaceDisplay for Box<D> {
    fn initialize(&mut self) -> Result<(), DisplayError> {
        (**self).initialize()
    }

    fn set_theme(&mut self, theme: ThemeKey) {
        (**self).set_theme(theme);
    }

    fn set_speaking(&mut self, active: bool) {
        (**self).set_speaking(active);
    }

    fn render_frame(&mut self, mode: OperationalMode, status: &str) {
        (**self).render_frame(mode, status);
    }

    fn shutdown(&mut self) {
        (**self).shutdown();
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

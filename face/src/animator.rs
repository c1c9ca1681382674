//! Display Animator
//!
//! Owns the render surface and the animation state and produces one frame
//! per tick. This is the [`FaceDisplay`] the coordinator drives.
//!
//! # Frame Timing
//!
//! Frame deltas come from `std::time::Instant`. The tick driver already
//! paces frames, and a late tick is followed by an early one, so only
//! frames closer than half a 60 fps frame to the previous one are dropped.
//! The skipped time is carried into the next frame that does render.
//!
//! # Degraded Operation
//!
//! If no surface can be acquired the animator stays disabled and every
//! call is a no-op. Render errors skip the frame; the first one is logged
//! as a warning, the rest at debug.

use std::time::{Duration, Instant};

use robot_core::{AnimationState, DisplayError, FaceDisplay, OperationalMode, ThemeKey};

use crate::scene::FaceScene;
use crate::surface::{FaceFrame, RenderSurface, TerminalSurface};
use crate::theme::FaceColors;

/// Shortest gap between presented frames (half of a 60 fps frame)
const MIN_FRAME_GAP: Duration = Duration::from_micros(1_000_000 / 60 / 2);

/// Produces a surface when the display initializes
pub type SurfaceFactory =
    Box<dyn FnMut() -> Result<Box<dyn RenderSurface>, DisplayError> + Send>;

/// Animated robot face
pub struct DisplayAnimator {
    factory: Option<SurfaceFactory>,
    surface: Option<Box<dyn RenderSurface>>,
    animation: AnimationState,
    theme: ThemeKey,
    last_frame: Option<Instant>,
    render_failures: u64,
}

impl DisplayAnimator {
    /// Animator that takes over the controlling terminal on initialize
    #[must_use]
    pub fn terminal() -> Self {
        Self::with_surface_factory(Box::new(|| {
            TerminalSurface::acquire().map(|s| Box::new(s) as Box<dyn RenderSurface>)
        }))
    }

    /// Animator drawing onto whatever `factory` produces
    #[must_use]
    pub fn with_surface_factory(factory: SurfaceFactory) -> Self {
        Self {
            factory: Some(factory),
            ..Self::headless()
        }
    }

    /// Animator that never acquires a surface
    #[must_use]
    pub fn headless() -> Self {
        Self {
            factory: None,
            surface: None,
            animation: AnimationState::new(),
            theme: ThemeKey::default(),
            last_frame: None,
            render_failures: 0,
        }
    }

    /// Current animation state
    #[must_use]
    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// Active theme
    #[must_use]
    pub fn theme(&self) -> ThemeKey {
        self.theme
    }

    /// Frames that failed to present
    #[must_use]
    pub fn render_failures(&self) -> u64 {
        self.render_failures
    }

    /// Advance the animation by `delta` and present one frame
    ///
    /// Bypasses the frame cap; [`FaceDisplay::render_frame`] uses the wall
    /// clock instead.
    pub fn advance_and_render(&mut self, delta: Duration, mode: OperationalMode, status: &str) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        self.animation.advance(delta);
        let scene = FaceScene::compose(&self.animation);
        let frame = FaceFrame {
            scene: &scene,
            colors: FaceColors::for_theme(self.theme),
            mode,
            status,
        };

        if let Err(e) = surface.draw(&frame) {
            self.render_failures += 1;
            if self.render_failures == 1 {
                tracing::warn!(error = %e, "Frame skipped");
            } else {
                tracing::debug!(error = %e, failures = self.render_failures, "Frame skipped");
            }
        }
    }
}

impl FaceDisplay for DisplayAnimator {
    fn initialize(&mut self) -> Result<(), DisplayError> {
        if self.surface.is_some() {
            return Ok(());
        }
        let Some(factory) = self.factory.as_mut() else {
            return Err(DisplayError::SurfaceUnavailable("headless".to_string()));
        };

        let surface = factory()?;
        self.surface = Some(surface);
        self.last_frame = None;
        tracing::info!(theme = %self.theme, "Display initialized");
        Ok(())
    }

    fn set_theme(&mut self, theme: ThemeKey) {
        if self.theme != theme {
            tracing::debug!(theme = %theme, "Display theme set");
        }
        self.theme = theme;
    }

    fn set_speaking(&mut self, active: bool) {
        self.animation.set_speaking(active);
    }

    fn render_frame(&mut self, mode: OperationalMode, status: &str) {
        if self.surface.is_none() {
            return;
        }

        let now = Instant::now();
        let delta = match self.last_frame {
            Some(last) => {
                let delta = now.duration_since(last);
                if delta < MIN_FRAME_GAP {
                    return;
                }
                delta
            }
            None => Duration::ZERO,
        };
        self.last_frame = Some(now);

        self.advance_and_render(delta, mode, status);
    }

    fn shutdown(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            tracing::info!("Display service shut down");
        }
    }

    fn is_enabled(&self) -> bool {
        self.surface.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Counts presented frames; can be told to fail
    struct CountingSurface {
        drawn: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
        fail: bool,
    }

    impl RenderSurface for CountingSurface {
        fn draw(&mut self, _frame: &FaceFrame<'_>) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Render("broken pipe".into()));
            }
            self.drawn.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting(fail: bool) -> (DisplayAnimator, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let drawn = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let (d, r) = (Arc::clone(&drawn), Arc::clone(&released));
        let animator = DisplayAnimator::with_surface_factory(Box::new(move || {
            Ok(Box::new(CountingSurface {
                drawn: Arc::clone(&d),
                released: Arc::clone(&r),
                fail,
            }) as Box<dyn RenderSurface>)
        }));
        (animator, drawn, released)
    }

    #[test]
    fn test_headless_is_a_noop() {
        let mut animator = DisplayAnimator::headless();
        assert!(matches!(
            animator.initialize(),
            Err(DisplayError::SurfaceUnavailable(_))
        ));
        assert!(!animator.is_enabled());

        animator.advance_and_render(Duration::from_secs(10), OperationalMode::Kid, "Ready");
        // Nothing advanced without a surface
        assert_eq!(animator.animation().blink_timer(), Duration::ZERO);
        animator.shutdown();
    }

    #[test]
    fn test_failed_factory_leaves_display_disabled() {
        let mut animator = DisplayAnimator::with_surface_factory(Box::new(|| {
            Err(DisplayError::SurfaceUnavailable("no tty".into()))
        }));
        assert!(animator.initialize().is_err());
        assert!(!animator.is_enabled());
        animator.render_frame(OperationalMode::Kid, "Ready");
    }

    #[test]
    fn test_frames_reach_the_surface() {
        let (mut animator, drawn, _) = counting(false);
        animator.initialize().unwrap();

        for _ in 0..5 {
            animator.advance_and_render(Duration::from_millis(16), OperationalMode::Kid, "Ready");
        }
        assert_eq!(drawn.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_frame_cap_drops_back_to_back_frames() {
        let (mut animator, drawn, _) = counting(false);
        animator.initialize().unwrap();

        animator.render_frame(OperationalMode::Kid, "Ready");
        animator.render_frame(OperationalMode::Kid, "Ready");
        animator.render_frame(OperationalMode::Kid, "Ready");

        assert_eq!(drawn.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_early_tick_after_a_late_one_still_renders() {
        let (mut animator, drawn, _) = counting(false);
        animator.initialize().unwrap();

        // A 60 Hz schedule where the second tick ran 5 ms late
        animator.render_frame(OperationalMode::Kid, "Ready");
        std::thread::sleep(Duration::from_millis(22));
        animator.render_frame(OperationalMode::Kid, "Ready");
        std::thread::sleep(Duration::from_millis(12));
        animator.render_frame(OperationalMode::Kid, "Ready");

        assert_eq!(drawn.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_render_errors_skip_the_frame() {
        let (mut animator, drawn, _) = counting(true);
        animator.initialize().unwrap();

        animator.advance_and_render(Duration::from_millis(16), OperationalMode::Kid, "Ready");
        animator.advance_and_render(Duration::from_millis(16), OperationalMode::Kid, "Ready");

        assert_eq!(drawn.load(Ordering::SeqCst), 0);
        assert_eq!(animator.render_failures(), 2);
        assert!(animator.is_enabled());
    }

    #[test]
    fn test_blink_runs_over_frames() {
        let (mut animator, _, _) = counting(false);
        animator.initialize().unwrap();

        animator.advance_and_render(Duration::from_millis(4001), OperationalMode::Kid, "Ready");
        assert!(animator.animation().is_blinking());

        let mut lowest = 1.0_f32;
        for _ in 0..20 {
            animator.advance_and_render(Duration::from_millis(16), OperationalMode::Kid, "Ready");
            let openness = animator.animation().eye_openness();
            assert!((0.0..=1.0).contains(&openness));
            lowest = lowest.min(openness);
        }
        assert!(lowest.abs() < f32::EPSILON);
        assert!(!animator.animation().is_blinking());
    }

    #[test]
    fn test_speaking_and_theme_apply_next_frame() {
        let (mut animator, _, _) = counting(false);
        animator.initialize().unwrap();

        animator.set_theme(ThemeKey::Cyber);
        animator.set_speaking(true);
        assert_eq!(animator.theme(), ThemeKey::Cyber);
        assert!(animator.animation().is_speaking());

        animator.advance_and_render(Duration::from_millis(16), OperationalMode::Cyber, "Speaking...");
        assert_eq!(animator.animation().mouth_phase(), 1);
    }

    #[test]
    fn test_shutdown_releases_once() {
        let (mut animator, _, released) = counting(false);
        animator.initialize().unwrap();

        animator.shutdown();
        animator.shutdown();

        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(!animator.is_enabled());
    }
}

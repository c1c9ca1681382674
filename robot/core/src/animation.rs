//! Face Animation State
//!
//! Per-frame state behind the robot face: the blink cycle and the talking
//! mouth. This is pure state; surfaces read it to draw and the display
//! animator advances it once per rendered frame.
//!
//! # Blink cycle
//!
//! A blink starts once more than [`BLINK_INTERVAL`] has passed since the
//! previous blink started. Eye openness then drops by [`BLINK_STEP`] every
//! frame until fully closed and climbs back by the same step until fully
//! open, which ends the blink. A full blink therefore takes
//! `2 / BLINK_STEP` frames regardless of frame rate.

use std::time::Duration;

/// Time between the starts of two blinks
pub const BLINK_INTERVAL: Duration = Duration::from_secs(4);

/// Openness change per frame while blinking
pub const BLINK_STEP: f32 = 0.2;

/// Radians of mouth oscillation per frame while speaking
pub const MOUTH_PHASE_RATE: f32 = 0.3;

/// Snap distance for the openness end points
const OPENNESS_EPSILON: f32 = 1e-4;

/// Blink and mouth state for one face
#[derive(Clone, Debug)]
pub struct AnimationState {
    /// Time since the last blink started
    since_blink: Duration,
    /// A blink is in progress
    blinking: bool,
    /// The current blink is still closing
    closing: bool,
    /// 0.0 = shut, 1.0 = wide open
    eye_openness: f32,
    /// Mouth animates while set
    speaking: bool,
    /// Frames spent speaking in the current utterance
    mouth_phase: u32,
}

impl AnimationState {
    /// Eyes open, not speaking, blink timer at zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            since_blink: Duration::ZERO,
            blinking: false,
            closing: false,
            eye_openness: 1.0,
            speaking: false,
            mouth_phase: 0,
        }
    }

    /// Advance one frame that follows `delta` of wall time
    pub fn advance(&mut self, delta: Duration) {
        self.since_blink = self.since_blink.saturating_add(delta);

        if !self.blinking && self.since_blink > BLINK_INTERVAL {
            self.blinking = true;
            self.closing = true;
            self.since_blink = Duration::ZERO;
        }

        if self.blinking {
            self.step_blink();
        }

        if self.speaking {
            self.mouth_phase = self.mouth_phase.wrapping_add(1);
        }
    }

    fn step_blink(&mut self) {
        if self.closing {
            self.eye_openness -= BLINK_STEP;
            if self.eye_openness <= OPENNESS_EPSILON {
                self.eye_openness = 0.0;
                self.closing = false;
            }
        } else {
            self.eye_openness += BLINK_STEP;
            if self.eye_openness >= 1.0 - OPENNESS_EPSILON {
                self.eye_openness = 1.0;
                self.blinking = false;
            }
        }
        self.eye_openness = self.eye_openness.clamp(0.0, 1.0);
    }

    /// Toggle the talking mouth; each new utterance starts from a closed mouth
    pub fn set_speaking(&mut self, active: bool) {
        if active && !self.speaking {
            self.mouth_phase = 0;
        }
        self.speaking = active;
    }

    /// Current eye openness in `[0.0, 1.0]`
    #[must_use]
    pub fn eye_openness(&self) -> f32 {
        self.eye_openness
    }

    /// Whether a blink is in progress
    #[must_use]
    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    /// Time since the last blink started
    #[must_use]
    pub fn blink_timer(&self) -> Duration {
        self.since_blink
    }

    /// Whether the mouth is animating
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Frames spent speaking in the current utterance
    #[must_use]
    pub fn mouth_phase(&self) -> u32 {
        self.mouth_phase
    }

    /// Mouth opening in `[0.0, 1.0]`; always 0 at rest
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mouth_openness(&self) -> f32 {
        if self.speaking {
            (self.mouth_phase as f32 * MOUTH_PHASE_RATE).sin().abs()
        } else {
            0.0
        }
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    /// Advance until a blink triggers, returning the number of frames taken
    fn run_until_blink(state: &mut AnimationState) -> usize {
        let mut frames = 0;
        while !state.is_blinking() {
            state.advance(FRAME);
            frames += 1;
            assert!(frames < 10_000, "blink never triggered");
        }
        frames
    }

    #[test]
    fn test_initial_state() {
        let state = AnimationState::new();
        assert_eq!(state.eye_openness(), 1.0);
        assert!(!state.is_blinking());
        assert!(!state.is_speaking());
        assert_eq!(state.mouth_openness(), 0.0);
    }

    #[test]
    fn test_no_blink_before_interval() {
        let mut state = AnimationState::new();
        state.advance(BLINK_INTERVAL);
        assert!(!state.is_blinking(), "exactly the interval must not trigger");
        assert_eq!(state.eye_openness(), 1.0);
    }

    #[test]
    fn test_blink_triggers_after_interval() {
        let mut state = AnimationState::new();
        state.advance(BLINK_INTERVAL + Duration::from_millis(1));
        assert!(state.is_blinking());
        assert!(state.eye_openness() < 1.0);
        assert_eq!(state.blink_timer(), Duration::ZERO);
    }

    #[test]
    fn test_blink_cycle_is_monotonic_and_bounded() {
        let mut state = AnimationState::new();
        run_until_blink(&mut state);

        let mut values = vec![state.eye_openness()];
        let bound = (2.0 / BLINK_STEP).ceil() as usize + 2;
        while state.is_blinking() {
            state.advance(FRAME);
            values.push(state.eye_openness());
            assert!(values.len() <= bound, "blink took more than {bound} frames");
        }

        let bottom = values
            .iter()
            .position(|v| *v == 0.0)
            .expect("blink must fully close");
        assert!(values[..=bottom].windows(2).all(|w| w[1] < w[0]));
        assert!(values[bottom..].windows(2).all(|w| w[1] > w[0]));
        assert_eq!(*values.last().unwrap(), 1.0);
    }

    #[test]
    fn test_openness_stays_in_range_for_any_deltas() {
        let mut state = AnimationState::new();
        // Small LCG so the sequence is varied but reproducible
        let mut seed: u64 = 0x5eed;
        for _ in 0..20_000 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let millis = (seed >> 33) % 6_000;
            state.advance(Duration::from_millis(millis));
            let openness = state.eye_openness();
            assert!((0.0..=1.0).contains(&openness), "openness {openness}");
        }
    }

    #[test]
    fn test_huge_delta_starts_only_one_blink() {
        let mut state = AnimationState::new();
        state.advance(Duration::from_secs(3600));
        assert!(state.is_blinking());
        let openness = state.eye_openness();
        assert!((openness - (1.0 - BLINK_STEP)).abs() < 1e-6);
    }

    #[test]
    fn test_next_blink_waits_for_interval() {
        let mut state = AnimationState::new();
        run_until_blink(&mut state);
        while state.is_blinking() {
            state.advance(FRAME);
        }
        // Blink frames count toward the next interval, so the gap is below it
        let frames = run_until_blink(&mut state);
        assert!(frames as u32 * 16 <= 4_016);
        assert!(frames > 200);
    }

    #[test]
    fn test_mouth_oscillates_while_speaking() {
        let mut state = AnimationState::new();
        state.set_speaking(true);

        let mut seen_open = false;
        for _ in 0..30 {
            state.advance(FRAME);
            let mouth = state.mouth_openness();
            assert!((0.0..=1.0).contains(&mouth));
            if mouth > 0.5 {
                seen_open = true;
            }
        }
        assert!(seen_open);
        assert_eq!(state.mouth_phase(), 30);
    }

    #[test]
    fn test_mouth_rests_when_silent() {
        let mut state = AnimationState::new();
        state.set_speaking(true);
        state.advance(FRAME);
        state.set_speaking(false);
        state.advance(FRAME);
        assert_eq!(state.mouth_openness(), 0.0);
    }

    #[test]
    fn test_new_utterance_resets_mouth_phase() {
        let mut state = AnimationState::new();
        state.set_speaking(true);
        state.advance(FRAME);
        state.advance(FRAME);
        state.set_speaking(false);
        state.set_speaking(true);
        assert_eq!(state.mouth_phase(), 0);
    }
}

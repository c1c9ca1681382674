//! Face Scene
//!
//! Pure geometry for one frame of the face, in logical canvas units with
//! the origin at the bottom left and `y` growing upwards. The surface maps
//! the canvas onto whatever cell grid it has.
//!
//! ```text
//!   600 ┌──────────────────────────────┐
//!       │      ( o )        ( o )      │  eyes at centre ± 150
//!       │                              │
//!       │          \________/          │  mouth
//!     0 └──────────────────────────────┘
//!       0                            800
//! ```

use robot_core::AnimationState;

/// Logical canvas width
pub const CANVAS_WIDTH: f64 = 800.0;

/// Logical canvas height
pub const CANVAS_HEIGHT: f64 = 600.0;

/// Horizontal distance from the centre to each eye
pub const EYE_OFFSET_X: f64 = 150.0;

/// Height of the eye centres
pub const EYE_Y: f64 = 360.0;

/// Outer eye radius
pub const OUTER_RADIUS: f64 = 80.0;

/// Iris radius
pub const IRIS_RADIUS: f64 = 50.0;

/// Pupil radius
pub const PUPIL_RADIUS: f64 = 25.0;

/// Highlight radius
pub const HIGHLIGHT_RADIUS: f64 = 8.0;

/// Highlight offset from the pupil centre (up and to the left)
pub const HIGHLIGHT_OFFSET: (f64, f64) = (-10.0, 10.0);

/// Eyes narrower than this are not drawn at all
pub const MIN_VISIBLE_OPENNESS: f32 = 0.1;

/// Height of the mouth centre
pub const MOUTH_Y: f64 = 170.0;

/// Mouth width
pub const MOUTH_WIDTH: f64 = 160.0;

/// Resting mouth height
pub const NEUTRAL_MOUTH_HEIGHT: f64 = 12.0;

/// Smallest talking mouth height
pub const SPEAKING_MOUTH_BASE: f64 = 10.0;

/// Extra height at the widest talking mouth
pub const SPEAKING_MOUTH_RANGE: f64 = 30.0;

/// What a shape is part of; decides its colour
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part {
    /// White of the eye
    Outer,
    /// Iris
    Iris,
    /// Pupil
    Pupil,
    /// Shine on the pupil
    Highlight,
    /// Mouth
    Mouth,
}

/// Axis-aligned filled ellipse
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Oval {
    /// What this shape draws
    pub part: Part,
    /// Centre x
    pub x: f64,
    /// Centre y
    pub y: f64,
    /// Horizontal radius
    pub rx: f64,
    /// Vertical radius
    pub ry: f64,
}

impl Oval {
    /// Whether the point lies inside the ellipse
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if self.rx <= 0.0 || self.ry <= 0.0 {
            return false;
        }
        let dx = (x - self.x) / self.rx;
        let dy = (y - self.y) / self.ry;
        dx * dx + dy * dy <= 1.0
    }
}

/// Shapes for one frame, in paint order (back to front)
#[derive(Clone, Debug, PartialEq)]
pub struct FaceScene {
    shapes: Vec<Oval>,
}

impl FaceScene {
    /// Lay out the face for the current animation state
    #[must_use]
    pub fn compose(animation: &AnimationState) -> Self {
        let openness = animation.eye_openness();
        let mut shapes = Vec::with_capacity(9);

        if openness >= MIN_VISIBLE_OPENNESS {
            let scale = f64::from(openness);
            for side in [-1.0, 1.0] {
                let x = CANVAS_WIDTH / 2.0 + side * EYE_OFFSET_X;
                for (part, radius) in [
                    (Part::Outer, OUTER_RADIUS),
                    (Part::Iris, IRIS_RADIUS),
                    (Part::Pupil, PUPIL_RADIUS),
                ] {
                    shapes.push(Oval {
                        part,
                        x,
                        y: EYE_Y,
                        rx: radius,
                        ry: radius * scale,
                    });
                }
                shapes.push(Oval {
                    part: Part::Highlight,
                    x: x + HIGHLIGHT_OFFSET.0,
                    y: EYE_Y + HIGHLIGHT_OFFSET.1 * scale,
                    rx: HIGHLIGHT_RADIUS,
                    ry: HIGHLIGHT_RADIUS * scale,
                });
            }
        }

        shapes.push(Oval {
            part: Part::Mouth,
            x: CANVAS_WIDTH / 2.0,
            y: MOUTH_Y,
            rx: MOUTH_WIDTH / 2.0,
            ry: mouth_height(animation) / 2.0,
        });

        Self { shapes }
    }

    /// All shapes, back to front
    #[must_use]
    pub fn shapes(&self) -> &[Oval] {
        &self.shapes
    }

    /// Eye shapes only (empty while the eyes are closed)
    pub fn eyes(&self) -> impl Iterator<Item = &Oval> {
        self.shapes.iter().filter(|s| s.part != Part::Mouth)
    }

    /// The mouth
    #[must_use]
    pub fn mouth(&self) -> Option<&Oval> {
        self.shapes.iter().find(|s| s.part == Part::Mouth)
    }
}

/// Mouth height for this frame
#[must_use]
pub fn mouth_height(animation: &AnimationState) -> f64 {
    if animation.is_speaking() {
        SPEAKING_MOUTH_BASE + SPEAKING_MOUTH_RANGE * f64::from(animation.mouth_openness())
    } else {
        NEUTRAL_MOUTH_HEIGHT
    }
}

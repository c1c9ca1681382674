//! Render Surfaces
//!
//! A [`RenderSurface`] turns a [`FaceScene`] plus the status line into
//! pixels. The terminal surface rasterizes the logical canvas with
//! half-block characters, so every cell carries two vertical pixels.
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │                              │
//!   │        face canvas           │  Canvas (HalfBlock marker)
//!   │                              │
//!   ├──────────────────────────────┤
//!   │ KID                   Ready  │  status bar (accent colour)
//!   └──────────────────────────────┘
//! ```

use std::io::{self, IsTerminal, Stdout};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Painter, Shape};
use ratatui::{Frame, Terminal};

use robot_core::{DisplayError, OperationalMode};

use crate::scene::{FaceScene, Oval, Part, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::theme::{FaceColors, EYE_SHINE};

/// Rows reserved for the status bar
pub const STATUS_BAR_ROWS: u16 = 1;

/// Everything needed to present one frame
#[derive(Clone, Copy, Debug)]
pub struct FaceFrame<'a> {
    /// Face geometry
    pub scene: &'a FaceScene,
    /// Active colours
    pub colors: FaceColors,
    /// Mode shown in the status bar
    pub mode: OperationalMode,
    /// Free-text status shown at the right of the status bar
    pub status: &'a str,
}

/// Something a face can be drawn onto
pub trait RenderSurface: Send {
    /// Present one frame
    ///
    /// # Errors
    ///
    /// [`DisplayError::Render`] if the frame could not be presented.
    fn draw(&mut self, frame: &FaceFrame<'_>) -> Result<(), DisplayError>;

    /// Give the surface back (restore the terminal); idempotent
    fn release(&mut self);
}

// ============================================================================
// Terminal Surface
// ============================================================================

/// Full-screen ratatui surface
pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    /// Raw mode and the alternate screen are ours to undo
    owns_screen: bool,
}

impl TerminalSurface<CrosstermBackend<Stdout>> {
    /// Take over the controlling terminal
    ///
    /// # Errors
    ///
    /// [`DisplayError::SurfaceUnavailable`] when stdout is not a terminal or
    /// the terminal cannot be switched to raw mode.
    pub fn acquire() -> Result<Self, DisplayError> {
        let mut stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(DisplayError::SurfaceUnavailable(
                "stdout is not a terminal".to_string(),
            ));
        }

        enable_raw_mode().map_err(unavailable)?;
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            restore_terminal();
            return Err(unavailable(e));
        }

        let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal();
                return Err(unavailable(e));
            }
        };
        if let Err(e) = terminal.clear() {
            restore_terminal();
            return Err(unavailable(e));
        }

        tracing::info!("Terminal surface acquired");
        Ok(Self {
            terminal,
            owns_screen: true,
        })
    }
}

impl<B: Backend> TerminalSurface<B> {
    /// Draw onto an existing backend without touching the real terminal
    ///
    /// # Errors
    ///
    /// [`DisplayError::SurfaceUnavailable`] if the backend cannot report
    /// its size.
    pub fn with_backend(backend: B) -> Result<Self, DisplayError> {
        Ok(Self {
            terminal: Terminal::new(backend).map_err(unavailable)?,
            owns_screen: false,
        })
    }

    /// The underlying backend
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl<B: Backend + Send> RenderSurface for TerminalSurface<B> {
    fn draw(&mut self, frame: &FaceFrame<'_>) -> Result<(), DisplayError> {
        self.terminal
            .draw(|f| render_face(f, frame))
            .map(|_| ())
            .map_err(|e| DisplayError::Render(e.to_string()))
    }

    fn release(&mut self) {
        if self.owns_screen {
            self.owns_screen = false;
            restore_terminal();
            tracing::info!("Terminal restored");
        }
    }
}

impl<B: Backend> Drop for TerminalSurface<B> {
    fn drop(&mut self) {
        if self.owns_screen {
            self.owns_screen = false;
            restore_terminal();
        }
    }
}

fn unavailable(e: io::Error) -> DisplayError {
    DisplayError::SurfaceUnavailable(e.to_string())
}

/// Leave raw mode and the alternate screen; errors are ignored
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

// ============================================================================
// Rasterizing
// ============================================================================

/// Draw a whole frame into `f`
pub fn render_face(f: &mut Frame<'_>, face: &FaceFrame<'_>) {
    let [face_area, bar_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_ROWS)])
            .areas(f.area());

    if face_area.width > 0 && face_area.height > 0 {
        // Sample twice per pixel so narrow shapes never fall between samples
        let step_x = CANVAS_WIDTH / f64::from(face_area.width) / 2.0;
        let step_y = CANVAS_HEIGHT / (f64::from(face_area.height) * 2.0) / 2.0;
        let colors = face.colors;

        let canvas = Canvas::default()
            .marker(Marker::HalfBlock)
            .background_color(colors.background)
            .x_bounds([0.0, CANVAS_WIDTH])
            .y_bounds([0.0, CANVAS_HEIGHT])
            .paint(move |ctx| {
                ctx.draw(&Backdrop {
                    color: colors.background,
                    step_x,
                    step_y,
                });
                for oval in face.scene.shapes() {
                    ctx.draw(&FilledOval {
                        oval: *oval,
                        color: part_color(oval.part, &colors),
                        step_x,
                        step_y,
                    });
                }
            });
        f.render_widget(canvas, face_area);
    }

    render_status_bar(f.buffer_mut(), bar_area, face);
}

fn part_color(part: Part, colors: &FaceColors) -> Color {
    match part {
        Part::Outer => colors.eye,
        Part::Pupil => colors.pupil,
        Part::Highlight => EYE_SHINE,
        Part::Iris | Part::Mouth => colors.accent,
    }
}

fn render_status_bar(buf: &mut Buffer, area: Rect, face: &FaceFrame<'_>) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let style = Style::default()
        .fg(face.colors.background)
        .bg(face.colors.accent)
        .add_modifier(Modifier::BOLD);
    buf.set_style(area, style);

    let label = format!(" {}", face.mode.as_str().to_uppercase());
    buf.set_stringn(area.x, area.y, &label, usize::from(area.width), style);

    let status = format!("{} ", face.status);
    let width = u16::try_from(status.chars().count()).unwrap_or(u16::MAX);
    if width < area.width {
        buf.set_string(area.right() - width, area.y, &status, style);
    }
}

/// Paints every pixel of the canvas
struct Backdrop {
    color: Color,
    step_x: f64,
    step_y: f64,
}

impl Shape for Backdrop {
    fn draw(&self, painter: &mut Painter<'_, '_>) {
        fill(
            painter,
            self.color,
            self.step_x,
            self.step_y,
            (0.0, CANVAS_WIDTH),
            (0.0, CANVAS_HEIGHT),
            |_, _| true,
        );
    }
}

/// Filled axis-aligned ellipse
struct FilledOval {
    oval: Oval,
    color: Color,
    step_x: f64,
    step_y: f64,
}

impl Shape for FilledOval {
    fn draw(&self, painter: &mut Painter<'_, '_>) {
        let o = self.oval;
        fill(
            painter,
            self.color,
            self.step_x,
            self.step_y,
            (o.x - o.rx, o.x + o.rx),
            (o.y - o.ry, o.y + o.ry),
            |x, y| o.contains(x, y),
        );
    }
}

fn fill<F>(
    painter: &mut Painter<'_, '_>,
    color: Color,
    step_x: f64,
    step_y: f64,
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
    inside: F,
) where
    F: Fn(f64, f64) -> bool,
{
    if step_x <= 0.0 || step_y <= 0.0 {
        return;
    }
    let mut x = x_min;
    while x <= x_max {
        let mut y = y_min;
        while y <= y_max {
            if inside(x, y) {
                if let Some((px, py)) = painter.get_point(x, y) {
                    painter.paint(px, py, color);
                }
            }
            y += step_y;
        }
        x += step_x;
    }
}

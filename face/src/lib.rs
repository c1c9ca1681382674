//! Robot Face - Terminal face for the Kali robot
//!
//! Draws the robot's animated face into a full-screen terminal and turns key
//! presses into robot commands. All behaviour lives in `robot-core`; this
//! crate is a thin surface that implements [`robot_core::FaceDisplay`].
//!
//! # Architecture
//!
//! - **Scene**: pure face geometry on a fixed logical canvas
//! - **Surface**: rasterizes a scene with ratatui (terminal or test backend)
//! - **Animator**: owns the surface and the animation state, one frame per tick
//! - **Input**: keyboard → [`robot_core::RobotCommand`]

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animator;
pub mod input;
pub mod scene;
pub mod surface;
pub mod theme;

pub use animator::DisplayAnimator;
pub use scene::FaceScene;
pub use surface::{RenderSurface, TerminalSurface};

//! # engine_input
//!
//! Input state buffers. Platform event handlers write into an
//! [`InputState`]; systems read a copy of it from the tick's argument bundle.
//!
//! - [`KeyboardState`]: held state for a fixed logical key vocabulary.
//! - [`MouseState`]: left button plus pointer position in canvas pixels.
//! - [`InputEvent`]: the raw events a platform delivers.

pub mod event;
pub mod keyboard;
pub mod mouse;

pub use event::{InputEvent, InputState};
pub use keyboard::{Key, KeyboardState};
pub use mouse::{CanvasMetrics, MouseState};

//! Raw input events and the combined input state they are applied to.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::keyboard::{Key, KeyboardState};
use crate::mouse::{CanvasMetrics, MouseState};

/// An input event as delivered by a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// A physical key went down (`code` as in `"KeyW"`).
    KeyDown { code: String },
    /// A physical key went up.
    KeyUp { code: String },
    /// A mouse button was pressed.
    MouseDown { button: u16 },
    /// A mouse button was released.
    MouseUp { button: u16 },
    /// The pointer moved, in raw (displayed) coordinates.
    MouseMove { x: f32, y: f32 },
}

/// Keyboard and pointer state together, as systems receive each tick.
///
/// Events arriving between ticks are simply folded into the state; systems
/// see the result on their next read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// Held logical keys.
    pub keyboard: KeyboardState,
    /// Pointer state.
    pub mouse: MouseState,
}

impl InputState {
    /// Create an idle input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the state.
    ///
    /// Returns `true` if the event was consumed, meaning the platform should
    /// suppress its default handling. Unmapped keys and untracked buttons
    /// return `false` and leave the state untouched.
    pub fn apply(&mut self, event: &InputEvent, canvas: &CanvasMetrics) -> bool {
        let consumed = match event {
            InputEvent::KeyDown { code } => self.keyboard.on_key_down(code),
            InputEvent::KeyUp { code } => self.keyboard.on_key_up(code),
            InputEvent::MouseDown { button } => self.mouse.on_button(*button, true),
            InputEvent::MouseUp { button } => self.mouse.on_button(*button, false),
            InputEvent::MouseMove { x, y } => {
                self.mouse.on_move(Vec2::new(*x, *y), canvas);
                false
            }
        };
        trace!(?event, consumed, "input event");
        consumed
    }

    /// Shorthand for `self.keyboard.is_down(key)`.
    #[must_use]
    pub fn is_down(&self, key: Key) -> bool {
        self.keyboard.is_down(key)
    }

    /// Release every key and the mouse button.
    pub fn reset(&mut self) {
        self.keyboard.reset();
        self.mouse.reset();
    }
}

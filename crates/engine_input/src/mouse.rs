//! Pointer state in logical canvas coordinates.
//!
//! The canvas may be displayed at a different size than its logical pixel
//! dimensions. Raw pointer coordinates are converted with
//!
//! ```text
//! logical = floor((raw - offset) / (displayed_size / logical_size))
//! ```
//!
//! so systems always see positions in the same pixel space they draw in.

use glam::Vec2;

/// Primary (left) mouse button index, as delivered by platforms.
pub const LEFT_BUTTON: u16 = 0;

/// Where the canvas sits on screen and how large it is, logically and as
/// displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMetrics {
    /// Top-left corner of the displayed canvas, in raw pointer coordinates.
    pub offset: Vec2,
    /// Displayed size of the canvas, in raw pointer units.
    pub displayed_size: Vec2,
    /// Logical pixel dimensions of the canvas.
    pub logical_size: Vec2,
}

impl CanvasMetrics {
    /// Metrics for a canvas displayed at its logical size with no offset.
    #[must_use]
    pub fn unscaled(width: u32, height: u32) -> Self {
        let size = Vec2::new(width as f32, height as f32);
        Self {
            offset: Vec2::ZERO,
            displayed_size: size,
            logical_size: size,
        }
    }

    /// Convert a raw pointer position into logical canvas pixels.
    ///
    /// Returns `None` while the canvas has a zero displayed or logical size.
    #[must_use]
    pub fn to_logical(&self, raw: Vec2) -> Option<(i32, i32)> {
        if self.displayed_size.cmple(Vec2::ZERO).any() || self.logical_size.cmple(Vec2::ZERO).any() {
            return None;
        }
        let scale = self.displayed_size / self.logical_size;
        let logical = ((raw - self.offset) / scale).floor();
        Some((logical.x as i32, logical.y as i32))
    }
}

/// Left button state and pointer position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    /// `true` while the left button is held.
    pub left: bool,
    /// Pointer x in logical canvas pixels.
    pub x: i32,
    /// Pointer y in logical canvas pixels.
    pub y: i32,
}

impl MouseState {
    /// Create a state with the button released at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a button press or release. Only the left button is tracked;
    /// returns `true` if the event changed tracked state.
    pub fn on_button(&mut self, button: u16, pressed: bool) -> bool {
        if button != LEFT_BUTTON {
            return false;
        }
        self.left = pressed;
        true
    }

    /// Process a pointer move given in raw coordinates.
    pub fn on_move(&mut self, raw: Vec2, canvas: &CanvasMetrics) {
        if let Some((x, y)) = canvas.to_logical(raw) {
            self.x = x;
            self.y = y;
        }
    }

    /// Release the button. The last known position is kept.
    pub fn reset(&mut self) {
        self.left = false;
    }
}

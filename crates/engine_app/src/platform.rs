//! Platform collaborator interfaces.
//!
//! The loop does not draw, open windows, or read devices itself. A
//! [`Platform`] hands it a [`Surface`] to draw on and a single stream of
//! [`PlatformEvent`]s (display refreshes and input events), which the loop
//! multiplexes with its own simulation timer.

use std::future::Future;

use engine_input::{CanvasMetrics, InputEvent};

/// Drawing primitives available to render-time systems.
pub trait DrawContext {
    /// Wipe the whole surface.
    fn clear(&mut self);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &str);

    /// Draw a named image centered on `(x, y)`, rotated by `angle` radians
    /// and scaled per axis (a negative scale mirrors).
    fn draw_image_centered(
        &mut self,
        image: &str,
        x: f64,
        y: f64,
        angle: f64,
        scale_x: f64,
        scale_y: f64,
    );
}

/// A drawing surface (a canvas).
pub trait Surface {
    /// The drawing context type. It is lent to systems through the tick's
    /// argument bundle, so it must be `'static`.
    type Context: DrawContext + 'static;

    /// Set the logical pixel dimensions.
    fn set_pixel_size(&mut self, width: u32, height: u32);

    /// Returns where the surface is displayed and at what size, for pointer
    /// coordinate conversion.
    fn metrics(&self) -> CanvasMetrics;

    /// Returns the drawing context, or `None` if the surface cannot provide
    /// one.
    fn context(&mut self) -> Option<&mut Self::Context>;
}

/// Something the platform wants the loop to handle.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// The display refreshed; carries the refresh timestamp in milliseconds
    /// on the platform's monotonic clock.
    Refresh(f64),
    /// An input event arrived.
    Input(InputEvent),
}

/// The host environment the loop runs in.
pub trait Platform {
    /// The surface type this platform provides.
    type Surface: Surface;

    /// Look up the drawing surface with the given id.
    fn acquire_surface(&mut self, id: &str) -> Option<Self::Surface>;

    /// Start delivering input events through [`Platform::next_event`].
    fn install_input(&mut self);

    /// Suppress the host's default action for an input event the loop
    /// consumed (a tracked key or mouse button).
    fn prevent_default(&mut self, event: &InputEvent);

    /// Wait for the next refresh or input event.
    ///
    /// The loop races this against its simulation timer and drops the
    /// future when the timer wins, so implementations must be cancel-safe:
    /// no event may be lost if the future is dropped before completing.
    fn next_event(&mut self) -> impl Future<Output = PlatformEvent>;

    /// Milliseconds elapsed on the platform's monotonic clock.
    fn now(&self) -> f64;
}

//! A windowless [`Platform`] driven by tokio timers.
//!
//! Refreshes fire on fixed deadlines at a configurable rate and are stamped
//! with the deadline itself, so measured rates and frame deltas are exact.
//! Input comes from a script of events keyed by refresh count, and drawing
//! is recorded into a shared [`DrawLog`]. Used by the demo binary and by tests; under a paused
//! tokio clock a whole run completes instantly and deterministically.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use engine_input::{CanvasMetrics, InputEvent};
use glam::Vec2;
use tokio::time::Instant;
use tracing::debug;

use crate::platform::{DrawContext, Platform, PlatformEvent, Surface};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// The surface was wiped.
    Clear,
    /// [`DrawContext::fill_rect`] in logical pixels.
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: String,
    },
    /// [`DrawContext::draw_image_centered`]; `angle` is in radians.
    Image {
        image: String,
        x: f64,
        y: f64,
        angle: f64,
        scale_x: f64,
        scale_y: f64,
    },
}

/// Shared record of the commands drawn since the last clear.
#[derive(Debug, Clone, Default)]
pub struct DrawLog(Rc<RefCell<Vec<DrawCommand>>>);

impl DrawLog {
    /// Returns a copy of the recorded commands.
    #[must_use]
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.0.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn push(&self, command: DrawCommand) {
        self.0.borrow_mut().push(command);
    }
}

/// Shared record of the input events whose default action was suppressed.
#[derive(Debug, Clone, Default)]
pub struct InputLog(Rc<RefCell<Vec<InputEvent>>>);

impl InputLog {
    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<InputEvent> {
        self.0.borrow().clone()
    }
}

/// A [`DrawContext`] that records instead of rasterizing.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    log: DrawLog,
}

impl RecordingContext {
    #[must_use]
    pub fn new(log: DrawLog) -> Self {
        Self { log }
    }

    #[must_use]
    pub fn log(&self) -> &DrawLog {
        &self.log
    }
}

impl DrawContext for RecordingContext {
    fn clear(&mut self) {
        let mut commands = self.log.0.borrow_mut();
        commands.clear();
        commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &str) {
        self.log.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            style: style.to_string(),
        });
    }

    fn draw_image_centered(
        &mut self,
        image: &str,
        x: f64,
        y: f64,
        angle: f64,
        scale_x: f64,
        scale_y: f64,
    ) {
        self.log.push(DrawCommand::Image {
            image: image.to_string(),
            x,
            y,
            angle,
            scale_x,
            scale_y,
        });
    }
}

/// An in-memory surface.
#[derive(Debug)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    display: Option<(Vec2, Vec2)>,
    context: Option<RecordingContext>,
    /// Context requests left before the context is lost.
    context_requests: Option<u64>,
}

impl HeadlessSurface {
    fn new(context: Option<RecordingContext>) -> Self {
        Self {
            width: 0,
            height: 0,
            display: None,
            context,
            context_requests: None,
        }
    }

    /// Returns the logical pixel size last set.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Surface for HeadlessSurface {
    type Context = RecordingContext;

    fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn metrics(&self) -> CanvasMetrics {
        let logical_size = Vec2::new(self.width as f32, self.height as f32);
        match self.display {
            Some((offset, displayed_size)) => CanvasMetrics {
                offset,
                displayed_size,
                logical_size,
            },
            None => CanvasMetrics::unscaled(self.width, self.height),
        }
    }

    fn context(&mut self) -> Option<&mut RecordingContext> {
        if let Some(remaining) = self.context_requests.as_mut() {
            match remaining.checked_sub(1) {
                Some(left) => *remaining = left,
                None => self.context = None,
            }
        }
        self.context.as_mut()
    }
}

/// A platform with no display and no devices.
#[derive(Debug)]
pub struct HeadlessPlatform {
    refresh_period: Duration,
    /// Deadline of the first refresh, set when refreshes are first awaited.
    first_refresh: Option<Instant>,
    origin: Instant,
    refreshes: u64,
    surfaces: HashMap<String, HeadlessSurface>,
    logs: HashMap<String, DrawLog>,
    script: VecDeque<(u64, InputEvent)>,
    input_installed: bool,
    prevented: InputLog,
}

impl HeadlessPlatform {
    /// Create a platform whose display refreshes at `refresh_hz`.
    /// Non-positive rates are treated as 60 Hz.
    #[must_use]
    pub fn new(refresh_hz: f64) -> Self {
        let refresh_hz = if refresh_hz > 0.0 && refresh_hz.is_finite() {
            refresh_hz
        } else {
            60.0
        };
        Self {
            refresh_period: Duration::from_secs_f64(1.0 / refresh_hz).max(Duration::from_nanos(1)),
            first_refresh: None,
            origin: Instant::now(),
            refreshes: 0,
            surfaces: HashMap::new(),
            logs: HashMap::new(),
            script: VecDeque::new(),
            input_installed: false,
            prevented: InputLog::default(),
        }
    }

    /// Add a surface with a recording context.
    #[must_use]
    pub fn with_surface(mut self, id: &str) -> Self {
        let log = DrawLog::default();
        self.logs.insert(id.to_string(), log.clone());
        self.surfaces
            .insert(id.to_string(), HeadlessSurface::new(Some(RecordingContext::new(log))));
        self
    }

    /// Add a surface that cannot provide a drawing context.
    #[must_use]
    pub fn with_surface_without_context(mut self, id: &str) -> Self {
        self.surfaces.insert(id.to_string(), HeadlessSurface::new(None));
        self
    }

    /// Make surface `id` lose its drawing context once it has been handed
    /// out `requests` times.
    #[must_use]
    pub fn with_context_lost_after(mut self, id: &str, requests: u64) -> Self {
        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.context_requests = Some(requests);
        }
        self
    }

    /// Display the surface `id` at `displayed_size`, offset by `offset`,
    /// instead of at its logical size.
    #[must_use]
    pub fn with_display(mut self, id: &str, offset: Vec2, displayed_size: Vec2) -> Self {
        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.display = Some((offset, displayed_size));
        }
        self
    }

    /// Queue `event` for delivery once `after_refreshes` refreshes have
    /// happened. Events are held until input is installed.
    #[must_use]
    pub fn with_input(mut self, after_refreshes: u64, event: InputEvent) -> Self {
        let at = self
            .script
            .iter()
            .position(|(frame, _)| *frame > after_refreshes)
            .unwrap_or(self.script.len());
        self.script.insert(at, (after_refreshes, event));
        self
    }

    /// Returns the draw log of surface `id`.
    #[must_use]
    pub fn draw_log(&self, id: &str) -> Option<DrawLog> {
        self.logs.get(id).cloned()
    }

    /// Returns the log of events passed to [`Platform::prevent_default`].
    #[must_use]
    pub fn prevented_input(&self) -> InputLog {
        self.prevented.clone()
    }

    fn pending_input(&mut self) -> Option<InputEvent> {
        if !self.input_installed {
            return None;
        }
        match self.script.front() {
            Some((frame, _)) if *frame <= self.refreshes => self.script.pop_front().map(|(_, event)| event),
            _ => None,
        }
    }
}

impl Platform for HeadlessPlatform {
    type Surface = HeadlessSurface;

    fn acquire_surface(&mut self, id: &str) -> Option<HeadlessSurface> {
        self.surfaces.remove(id)
    }

    fn install_input(&mut self) {
        debug!(scripted = self.script.len(), "input installed");
        self.input_installed = true;
    }

    fn prevent_default(&mut self, event: &InputEvent) {
        self.prevented.0.borrow_mut().push(event.clone());
    }

    async fn next_event(&mut self) -> PlatformEvent {
        if let Some(event) = self.pending_input() {
            return PlatformEvent::Input(event);
        }
        let first = *self.first_refresh.get_or_insert_with(Instant::now);
        let deadline = first + self.refresh_period.mul_f64(self.refreshes as f64);
        // Nothing changes before the sleep completes, so dropping this
        // future loses no refresh.
        tokio::time::sleep_until(deadline).await;
        self.refreshes += 1;
        PlatformEvent::Refresh(deadline.duration_since(self.origin).as_secs_f64() * 1000.0)
    }

    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

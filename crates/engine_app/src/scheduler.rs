//! Dual-cadence loop scheduler.
//!
//! Two repeating activities share one task:
//!
//! - the **simulation cadence**, a fixed-rate timer firing the update
//!   callback with the absolute time;
//! - the **render cadence**, one call per display refresh, firing the render
//!   callback with the drawing context, the absolute time, and the delta
//!   since the previous refresh.
//!
//! Both cadences and input events are branches of a single `select!`, so no
//! two callbacks ever run at the same time and each runs to completion.
//!
//! ## Startup Sequence
//!
//! 1. Acquire the drawing surface and set its pixel size.
//! 2. Check that the surface provides a drawing context.
//! 3. Install input delivery.
//! 4. Measure the display refresh rate from two consecutive refreshes.
//! 5. Await the initialization callback.
//! 6. Start both cadences.
//!
//! Any failure before step 6 aborts with a [`StartupError`]; neither cadence
//! is started.

use std::time::Duration;

use engine_input::{CanvasMetrics, InputState};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::LoopConfig;
use crate::error::{AssetError, StartupError};
use crate::platform::{Platform, PlatformEvent, Surface};

/// The drawing context type of a platform.
pub type ContextOf<P> = <<P as Platform>::Surface as Surface>::Context;

/// What the render callback receives besides the drawing context.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Zero-based index of this refresh. Skipped refreshes use up an index.
    pub index: u64,
    /// Refresh timestamp, in milliseconds on the platform clock.
    pub time_ms: f64,
    /// Milliseconds since the previous refresh. The first frame measures
    /// from the last refresh seen during startup.
    pub dt_ms: f64,
    /// Input state as of this refresh.
    pub input: &'a InputState,
}

/// Counters reported when a bounded loop finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopStats {
    /// Simulation rate the loop ran at, in Hz.
    pub sim_rate: f64,
    /// Refreshes handled, including those skipped for lack of a drawing
    /// context.
    pub frames: u64,
    /// Refreshes skipped because the drawing context was lost.
    pub skipped: u64,
    /// Simulation callbacks fired.
    pub updates: u64,
}

/// A game loop that has not started yet.
#[derive(Debug)]
pub struct GameLoop<P> {
    platform: P,
    config: LoopConfig,
}

impl<P: Platform> GameLoop<P> {
    /// Create a loop over `platform`.
    #[must_use]
    pub fn new(platform: P, config: LoopConfig) -> Self {
        Self { platform, config }
    }

    /// Returns the loop configuration.
    #[must_use]
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run the startup sequence, ending with `init`.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] if the surface or its context is missing or
    /// `init` fails. An [`AssetError`] inside `init`'s error becomes
    /// [`StartupError::Asset`]; anything else is [`StartupError::Init`].
    pub async fn start<I>(mut self, init: I) -> Result<Started<P>, StartupError>
    where
        I: AsyncFnOnce(&mut P::Surface) -> anyhow::Result<()>,
    {
        let config = self.config;
        let mut surface = self
            .platform
            .acquire_surface(&config.surface_id)
            .ok_or_else(|| StartupError::SurfaceNotFound(config.surface_id.clone()))?;
        surface.set_pixel_size(config.width, config.height);
        if surface.context().is_none() {
            return Err(StartupError::ContextUnavailable(config.surface_id.clone()));
        }

        self.platform.install_input();
        let mut input = InputState::new();

        let (measured, last_refresh) =
            measure_refresh_rate(&mut self.platform, &mut input, &surface.metrics()).await;
        let sim_rate = config.simulation_rate(measured);
        info!(
            surface = %config.surface_id,
            width = config.width,
            height = config.height,
            measured_fps = measured,
            sim_rate,
            "running at {sim_rate} FPS"
        );

        init(&mut surface).await.map_err(|err| match err.downcast::<AssetError>() {
            Ok(asset) => StartupError::Asset(asset),
            Err(err) => StartupError::Init(err),
        })?;
        debug!("initialization complete");

        Ok(Started {
            platform: self.platform,
            surface,
            config,
            input,
            sim_rate,
            last_refresh,
        })
    }

    /// Start the loop and run it until `max_frames` refreshes have been
    /// handled (forever if `max_frames` is 0).
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] if startup fails; see [`GameLoop::start`].
    pub async fn run<I, U, R>(self, init: I, update: U, render: R) -> Result<LoopStats, StartupError>
    where
        I: AsyncFnOnce(&mut P::Surface) -> anyhow::Result<()>,
        U: FnMut(f64),
        R: FnMut(&mut ContextOf<P>, Frame<'_>),
    {
        let started = self.start(init).await?;
        Ok(started.run(update, render).await)
    }
}

/// A game loop past its startup sequence, ready to run both cadences.
#[derive(Debug)]
pub struct Started<P: Platform> {
    platform: P,
    surface: P::Surface,
    config: LoopConfig,
    input: InputState,
    sim_rate: f64,
    last_refresh: f64,
}

impl<P: Platform> Started<P> {
    /// Returns the chosen simulation rate, in Hz.
    #[must_use]
    pub fn sim_rate(&self) -> f64 {
        self.sim_rate
    }

    /// Returns the input state collected so far.
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Returns the acquired surface.
    pub fn surface_mut(&mut self) -> &mut P::Surface {
        &mut self.surface
    }

    /// Run both cadences.
    ///
    /// `update` fires at the simulation rate with the absolute time in
    /// milliseconds. `render` fires once per display refresh. Returns only
    /// when `max_frames` is non-zero and that many refreshes have been handled.
    pub async fn run<U, R>(self, mut update: U, mut render: R) -> LoopStats
    where
        U: FnMut(f64),
        R: FnMut(&mut ContextOf<P>, Frame<'_>),
    {
        let Started {
            mut platform,
            mut surface,
            config,
            mut input,
            sim_rate,
            last_refresh,
        } = self;

        let period = Duration::from_secs_f64(1.0 / sim_rate).max(Duration::from_nanos(1));
        let budget_ms = period.as_secs_f64() * 1000.0;
        let mut sim = tokio::time::interval_at(Instant::now() + period, period);
        sim.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut stats = LoopStats {
            sim_rate,
            frames: 0,
            skipped: 0,
            updates: 0,
        };
        let mut last_render = last_refresh;

        info!(sim_rate, max_frames = config.max_frames, "starting game loop");

        loop {
            tokio::select! {
                _ = sim.tick() => {
                    update(platform.now());
                    stats.updates += 1;
                }
                event = platform.next_event() => match event {
                    PlatformEvent::Input(event) => {
                        if input.apply(&event, &surface.metrics()) {
                            platform.prevent_default(&event);
                        }
                    }
                    PlatformEvent::Refresh(time_ms) => {
                        let dt_ms = time_ms - last_render;
                        last_render = time_ms;

                        if let Some(ctx) = surface.context() {
                            let started_at = platform.now();
                            render(
                                ctx,
                                Frame {
                                    index: stats.frames,
                                    time_ms,
                                    dt_ms,
                                    input: &input,
                                },
                            );
                            let cost_ms = platform.now() - started_at;
                            if cost_ms > budget_ms {
                                warn!(
                                    frame = stats.frames,
                                    cost_ms,
                                    budget_ms,
                                    "frame exceeded simulation budget"
                                );
                            }
                        } else {
                            warn!(frame = stats.frames, "drawing context lost, skipping frame");
                            stats.skipped += 1;
                        }

                        // Skipped frames count toward `max_frames`.
                        stats.frames += 1;
                        if config.max_frames > 0 && stats.frames >= config.max_frames {
                            info!(
                                frames = stats.frames,
                                skipped = stats.skipped,
                                updates = stats.updates,
                                "game loop complete"
                            );
                            return stats;
                        }
                    }
                },
            }
        }
    }
}

/// Time two consecutive refreshes and convert the gap into a rate in Hz,
/// rounded to the nearest integer. Input arriving meanwhile is applied.
///
/// Returns the rate (0 if the refreshes are not strictly increasing) and the
/// timestamp of the second refresh.
async fn measure_refresh_rate<P: Platform>(
    platform: &mut P,
    input: &mut InputState,
    canvas: &CanvasMetrics,
) -> (f64, f64) {
    let first = next_refresh(platform, input, canvas).await;
    let second = next_refresh(platform, input, canvas).await;
    let gap = second - first;
    let rate = if gap > 0.0 { (1000.0 / gap).round() } else { 0.0 };
    (rate, second)
}

async fn next_refresh<P: Platform>(
    platform: &mut P,
    input: &mut InputState,
    canvas: &CanvasMetrics,
) -> f64 {
    loop {
        match platform.next_event().await {
            PlatformEvent::Refresh(time_ms) => return time_ms,
            PlatformEvent::Input(event) => {
                if input.apply(&event, canvas) {
                    platform.prevent_default(&event);
                }
            }
        }
    }
}

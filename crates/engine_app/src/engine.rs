//! ECS wiring onto the game loop.
//!
//! [`Engine`] owns a [`World`] and drives it from the render cadence: each
//! display refresh becomes one [`World::run_tick`] with the argument keys
//! below. The simulation cadence still fires the caller's update callback.

use engine_ecs::{ArgBundle, World};
use tracing::trace;

use crate::config::LoopConfig;
use crate::error::StartupError;
use crate::platform::{DrawContext, Platform};
use crate::scheduler::{GameLoop, LoopStats};

/// Seconds since the previous refresh (`f64`).
pub const ARG_DT: &str = "dt";
/// Refresh timestamp in milliseconds (`f64`).
pub const ARG_TIME: &str = "t";
/// Input state as of this refresh ([`engine_input::InputState`]).
pub const ARG_INPUT: &str = "input";
/// The surface's drawing context (the platform's `Surface::Context`).
pub const ARG_CTX: &str = "ctx";

/// A world bound to a platform.
#[derive(Debug)]
pub struct Engine<P> {
    world: World,
    game_loop: GameLoop<P>,
    clear_each_frame: bool,
}

impl<P: Platform> Engine<P> {
    /// Bind `world` to `platform`. Nothing runs until [`Engine::run`].
    #[must_use]
    pub fn new(world: World, platform: P, config: LoopConfig) -> Self {
        Self {
            world,
            game_loop: GameLoop::new(platform, config),
            clear_each_frame: true,
        }
    }

    /// Whether to clear the surface before each tick. On by default.
    #[must_use]
    pub fn clear_each_frame(mut self, clear: bool) -> Self {
        self.clear_each_frame = clear;
        self
    }

    /// Returns the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the world for setup before [`Engine::run`].
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Start the loop and tick the world once per display refresh.
    ///
    /// `init` runs once during startup with the world and the surface, so it
    /// can load assets and spawn the initial entities. Returns the world and
    /// loop counters once `max_frames` refreshes have been handled.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] if startup fails. An [`AssetError`](crate::AssetError)
    /// propagated out of `init` is reported as [`StartupError::Asset`].
    pub async fn run<I, U>(self, init: I, update: U) -> Result<(World, LoopStats), StartupError>
    where
        I: AsyncFnOnce(&mut World, &mut P::Surface) -> anyhow::Result<()>,
        U: FnMut(f64),
    {
        let Engine {
            mut world,
            game_loop,
            clear_each_frame,
        } = self;

        let started = game_loop
            .start(async |surface: &mut P::Surface| init(&mut world, surface).await)
            .await?;

        let stats = started
            .run(update, |ctx, frame| {
                if clear_each_frame {
                    ctx.clear();
                }
                let mut args = ArgBundle::new()
                    .with(ARG_DT, frame.dt_ms / 1000.0)
                    .with(ARG_TIME, frame.time_ms)
                    .with(ARG_INPUT, *frame.input)
                    .with_borrowed(ARG_CTX, ctx);
                let tick = world.run_tick(&mut args);
                trace!(
                    frame = frame.index,
                    systems = tick.systems,
                    invocations = tick.invocations,
                    "frame ticked"
                );
            })
            .await;

        Ok((world, stats))
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{Spawn, props};
    use engine_input::{InputEvent, InputState, Key};
    use serde_json::json;

    use super::*;
    use crate::headless::{DrawCommand, HeadlessPlatform, HeadlessSurface, RecordingContext};

    #[tokio::test(start_paused = true)]
    async fn test_systems_tick_once_per_frame() {
        let mut world = World::new();
        let counter = world.define_component(props(json!({"n": 0})));
        world
            .define_system(&[], &[counter], |_, bundles| {
                let n = bundles[0]["n"].as_i64().unwrap_or(0);
                bundles[0].insert("n".into(), json!(n + 1));
            })
            .unwrap();

        let platform = HeadlessPlatform::new(60.0).with_surface("canvas");
        let engine = Engine::new(world, platform, LoopConfig::new("canvas", 64, 64).with_max_frames(12));
        let (world, stats) = engine
            .run(
                async |world: &mut World, _: &mut HeadlessSurface| {
                    world.spawn([Spawn::Default(counter)])?;
                    Ok(())
                },
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(stats.frames, 12);
        let (_, entity) = world.entities().next().unwrap();
        assert_eq!(entity.get(counter).unwrap()["n"], json!(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_args_carry_dt_input_and_ctx() {
        let mut world = World::new();
        let pos = world.define_component(props(json!({"x": 0.0})));
        world
            .define_system(&[ARG_DT, ARG_INPUT, ARG_CTX], &[pos], |args, bundles| {
                let dt = *args.get::<f64>(0).unwrap();
                let right = args.get::<InputState>(1).unwrap().is_down(Key::D);
                let x = bundles[0]["x"].as_f64().unwrap_or(0.0);
                let x = if right { x + 60.0 * dt } else { x };
                bundles[0].insert("x".into(), json!(x));
                if let Some(ctx) = args.get_mut::<RecordingContext>(2) {
                    ctx.fill_rect(x, 0.0, 1.0, 1.0, "white");
                }
            })
            .unwrap();

        let platform = HeadlessPlatform::new(60.0)
            .with_surface("canvas")
            .with_input(2, InputEvent::KeyDown { code: "KeyD".into() });
        let log = platform.draw_log("canvas").unwrap();
        let engine = Engine::new(world, platform, LoopConfig::new("canvas", 64, 64).with_max_frames(60));
        let (world, _) = engine
            .run(
                async |world: &mut World, _: &mut HeadlessSurface| {
                    world.spawn([Spawn::Default(pos)])?;
                    Ok(())
                },
                |_| {},
            )
            .await
            .unwrap();

        let (_, entity) = world.entities().next().unwrap();
        let x = entity.get(pos).unwrap()["x"].as_f64().unwrap();
        // D is down before the first frame: one second at 60 px/s.
        assert!((x - 60.0).abs() < 2.0, "x = {x}");

        let commands = log.commands();
        assert_eq!(commands[0], DrawCommand::Clear);
        assert!(matches!(commands[1], DrawCommand::FillRect { .. }));
        assert_eq!(commands.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_error_is_startup_error() {
        let platform = HeadlessPlatform::new(60.0).with_surface("canvas");
        let engine = Engine::new(World::new(), platform, LoopConfig::new("canvas", 64, 64));
        let err = engine
            .run(
                async |_: &mut World, _: &mut HeadlessSurface| Err(anyhow::anyhow!("no level")),
                |_| {},
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::Init(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_clear_keeps_history() {
        let mut world = World::new();
        let dot = world.define_component(props(json!({})));
        world
            .define_system(&[ARG_CTX], &[dot], |args, _| {
                if let Some(ctx) = args.get_mut::<RecordingContext>(0) {
                    ctx.fill_rect(0.0, 0.0, 1.0, 1.0, "red");
                }
            })
            .unwrap();

        let platform = HeadlessPlatform::new(60.0).with_surface("canvas");
        let log = platform.draw_log("canvas").unwrap();
        let engine = Engine::new(world, platform, LoopConfig::new("canvas", 8, 8).with_max_frames(3))
            .clear_each_frame(false);
        engine
            .run(
                async |world: &mut World, _: &mut HeadlessSurface| {
                    world.spawn([Spawn::Default(dot)])?;
                    Ok(())
                },
                |_| {},
            )
            .await
            .unwrap();
        assert_eq!(log.len(), 3);
    }
}

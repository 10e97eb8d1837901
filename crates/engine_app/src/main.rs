//! # engine_app demo
//!
//! Runs a small bouncing-boxes world on the headless platform and logs the
//! final entity state. A scripted input sequence steers the player box.
//!
//! ```text
//! RUST_LOG=engine_app=debug engine_app --frames 180 --fps 120
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use engine_app::{
    ARG_CTX, ARG_DT, ARG_INPUT, DrawContext, Engine, HeadlessPlatform, HeadlessSurface, LoopConfig,
    RecordingContext,
};
use engine_component::{ComponentId, Props, Spawn, props};
use engine_ecs::World;
use engine_input::{InputEvent, InputState, Key};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PLAYER_SPEED: f64 = 90.0;
const PALETTE: [&str; 5] = ["white", "red", "green", "blue", "yellow"];

#[derive(Parser)]
#[command(name = "engine_app", about = "Headless demo of the canvas ECS runtime")]
struct Args {
    /// JSON loop config; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames to render before exiting
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Simulation rate floor, in Hz
    #[arg(long)]
    fps: Option<f64>,

    /// Logical canvas width
    #[arg(long)]
    width: Option<u32>,

    /// Logical canvas height
    #[arg(long)]
    height: Option<u32>,

    /// Refresh rate of the headless display, in Hz
    #[arg(long, default_value_t = 60.0)]
    refresh_hz: f64,
}

struct Demo {
    position: ComponentId,
    velocity: ComponentId,
    body: ComponentId,
    player: ComponentId,
}

fn num(bundle: &Props, key: &str) -> f64 {
    bundle.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn build_world(width: f64, height: f64) -> Result<(World, Demo)> {
    let mut world = World::new();
    let demo = Demo {
        position: world.define_component(props(json!({"x": 0.0, "y": 0.0}))),
        velocity: world.define_component(props(json!({"vx": 0.0, "vy": 0.0}))),
        body: world.define_component(props(json!({"w": 8.0, "h": 8.0, "color": "white"}))),
        player: world.define_component(props(json!({"speed": PLAYER_SPEED}))),
    };

    world.define_named_system("steer", &[ARG_INPUT], &[demo.player, demo.velocity, demo.body], |args, bundles| {
        let Some(input) = args.get::<InputState>(0) else {
            return;
        };
        let speed = num(bundles[0], "speed");
        let axis = |neg: Key, pos: Key| f64::from(i8::from(input.is_down(pos)) - i8::from(input.is_down(neg)));
        bundles[1].insert("vx".into(), json!(axis(Key::A, Key::D) * speed));
        bundles[1].insert("vy".into(), json!(axis(Key::W, Key::S) * speed));

        let digits = [Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4, Key::Digit5];
        if let Some(slot) = digits.iter().position(|key| input.is_down(*key)) {
            bundles[2].insert("color".into(), json!(PALETTE[slot]));
        }
    })?;

    world.define_named_system("move", &[ARG_DT], &[demo.position, demo.velocity, demo.body], move |args, bundles| {
        let dt = args.get::<f64>(0).copied().unwrap_or(0.0);
        let (w, h) = (num(bundles[2], "w"), num(bundles[2], "h"));
        let (mut vx, mut vy) = (num(bundles[1], "vx"), num(bundles[1], "vy"));
        let mut x = num(bundles[0], "x") + vx * dt;
        let mut y = num(bundles[0], "y") + vy * dt;

        if x < 0.0 || x + w > width {
            x = x.clamp(0.0, (width - w).max(0.0));
            vx = -vx;
        }
        if y < 0.0 || y + h > height {
            y = y.clamp(0.0, (height - h).max(0.0));
            vy = -vy;
        }

        bundles[0].insert("x".into(), json!(x));
        bundles[0].insert("y".into(), json!(y));
        bundles[1].insert("vx".into(), json!(vx));
        bundles[1].insert("vy".into(), json!(vy));
    })?;

    world.define_named_system("draw", &[ARG_CTX], &[demo.position, demo.body], |args, bundles| {
        let Some(ctx) = args.get_mut::<RecordingContext>(0) else {
            return;
        };
        let color = bundles[1].get("color").and_then(Value::as_str).unwrap_or("white");
        ctx.fill_rect(
            num(bundles[0], "x"),
            num(bundles[0], "y"),
            num(bundles[1], "w"),
            num(bundles[1], "h"),
            color,
        );
    })?;

    Ok((world, demo))
}

fn with(component: ComponentId, overrides: Value) -> Spawn {
    Spawn::With(component, props(overrides))
}

fn spawn_boxes(world: &mut World, demo: &Demo) -> Result<()> {
    world.spawn([
        with(demo.position, json!({"x": 40.0, "y": 40.0})),
        Spawn::Default(demo.velocity),
        with(demo.body, json!({"w": 12.0, "h": 12.0})),
        Spawn::Default(demo.player),
    ])?;
    for i in 0..4 {
        let i = f64::from(i);
        world.spawn([
            with(demo.position, json!({"x": 20.0 + 50.0 * i, "y": 100.0})),
            with(demo.velocity, json!({"vx": 30.0 + 10.0 * i, "vy": -25.0 * (i + 1.0)})),
            Spawn::Default(demo.body),
        ])?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LoopConfig::from_json_file(path)?,
        None => LoopConfig::default(),
    };
    config.max_frames = args.frames;
    if let Some(fps) = args.fps {
        config.fps = Some(fps);
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    let (world, demo) = build_world(f64::from(config.width), f64::from(config.height))?;

    let platform = HeadlessPlatform::new(args.refresh_hz)
        .with_surface(&config.surface_id)
        .with_input(10, InputEvent::KeyDown { code: "KeyD".into() })
        .with_input(40, InputEvent::KeyDown { code: "Digit3".into() })
        .with_input(45, InputEvent::KeyUp { code: "Digit3".into() })
        .with_input(60, InputEvent::KeyUp { code: "KeyD".into() })
        .with_input(60, InputEvent::KeyDown { code: "KeyS".into() })
        .with_input(90, InputEvent::KeyUp { code: "KeyS".into() });
    let log = platform
        .draw_log(&config.surface_id)
        .context("headless surface has no draw log")?;

    info!(frames = config.max_frames, "starting demo");
    let mut updates = 0_u64;
    let (world, stats) = Engine::new(world, platform, config)
        .run(
            async |world: &mut World, _: &mut HeadlessSurface| spawn_boxes(world, &demo),
            |_| updates += 1,
        )
        .await?;

    info!(
        frames = stats.frames,
        updates,
        sim_rate = stats.sim_rate,
        drawn = log.len(),
        "demo finished"
    );
    for (entity, instance) in world.entities() {
        let Some(position) = instance.get(demo.position) else {
            continue;
        };
        let player = instance.has(demo.player);
        info!(
            %entity,
            player,
            x = num(position, "x"),
            y = num(position, "y"),
            "final position"
        );
    }
    Ok(())
}

use std::collections::HashMap;
use std::future::ready;

use engine_app::{
    ARG_CTX, ARG_INPUT, DrawCommand, DrawContext, Engine, HeadlessPlatform, HeadlessSurface,
    LoopConfig, RecordingContext, StartupError, Surface, load_batch,
};
use engine_component::{Spawn, props};
use engine_ecs::World;
use engine_input::{InputEvent, InputState};
use glam::Vec2;
use serde_json::{Value, json};

fn sprite_world() -> (World, engine_component::ComponentId, engine_component::ComponentId) {
    let mut world = World::new();
    let sprite = world.define_component(props(json!({"image": "", "x": 0, "y": 0})));
    let cursor = world.define_component(props(json!({"x": 0, "y": 0, "down": false})));

    world
        .define_named_system("follow-pointer", &[ARG_INPUT], &[sprite, cursor], |args, bundles| {
            let Some(input) = args.get::<InputState>(0) else {
                return;
            };
            bundles[1].insert("x".into(), json!(input.mouse.x));
            bundles[1].insert("y".into(), json!(input.mouse.y));
            bundles[1].insert("down".into(), json!(input.mouse.left));
            if input.mouse.left {
                bundles[0].insert("x".into(), json!(input.mouse.x));
                bundles[0].insert("y".into(), json!(input.mouse.y));
            }
        })
        .unwrap();

    world
        .define_named_system("draw-sprites", &[ARG_CTX], &[sprite], |args, bundles| {
            let Some(ctx) = args.get_mut::<RecordingContext>(0) else {
                return;
            };
            let image = bundles[0]["image"].as_str().unwrap_or_default().to_string();
            let x = bundles[0]["x"].as_f64().unwrap_or(0.0);
            let y = bundles[0]["y"].as_f64().unwrap_or(0.0);
            ctx.draw_image_centered(&image, x, y, 0.0, 1.0, 1.0);
        })
        .unwrap();

    (world, sprite, cursor)
}

#[tokio::test(start_paused = true)]
async fn test_headless_run_moves_sprite_to_click() {
    let (world, sprite, cursor) = sprite_world();

    // 320x180 canvas shown at twice its size.
    let platform = HeadlessPlatform::new(60.0)
        .with_surface("game")
        .with_display("game", Vec2::ZERO, Vec2::new(640.0, 360.0))
        .with_input(4, InputEvent::MouseMove { x: 200.0, y: 100.0 })
        .with_input(4, InputEvent::MouseDown { button: 0 })
        .with_input(6, InputEvent::MouseUp { button: 0 })
        .with_input(8, InputEvent::MouseMove { x: 10.0, y: 10.0 });
    let log = platform.draw_log("game").unwrap();

    let config = LoopConfig::new("game", 320, 180).with_max_frames(12);
    let (world, stats) = Engine::new(world, platform, config)
        .run(
            async |world: &mut World, surface: &mut HeadlessSurface| {
                assert_eq!(surface.pixel_size(), (320, 180));
                let paths = HashMap::from([("hero".to_string(), "sprites/hero.png".to_string())]);
                let images = load_batch(&paths, |path| {
                    ready(Ok::<_, std::io::Error>(path.trim_start_matches("sprites/").to_string()))
                })
                .await?;
                world.spawn([
                    Spawn::With(sprite, props(json!({"image": images["hero"]}))),
                    Spawn::Default(cursor),
                ])?;
                Ok(())
            },
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(stats.frames, 12);
    assert_eq!(stats.sim_rate, 60.0);

    let (_, entity) = world.entities().next().unwrap();
    let sprite_props = entity.get(sprite).unwrap();
    assert_eq!(sprite_props["x"], json!(100));
    assert_eq!(sprite_props["y"], json!(50));
    let cursor_props = entity.get(cursor).unwrap();
    assert_eq!(cursor_props["x"], json!(5));
    assert_eq!(cursor_props["down"], Value::Bool(false));

    assert_eq!(
        log.commands(),
        vec![
            DrawCommand::Clear,
            DrawCommand::Image {
                image: "hero.png".into(),
                x: 100.0,
                y: 50.0,
                angle: 0.0,
                scale_x: 1.0,
                scale_y: 1.0,
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_asset_batch_aborts_startup() {
    let (world, _, _) = sprite_world();
    let platform = HeadlessPlatform::new(60.0).with_surface("game");
    let mut updates = 0;

    let err = Engine::new(world, platform, LoopConfig::new("game", 320, 180).with_max_frames(5))
        .run(
            async |_: &mut World, _: &mut HeadlessSurface| {
                let paths = HashMap::from([("hero".to_string(), "missing.png".to_string())]);
                load_batch(&paths, |_| ready(Err::<(), _>("no such file"))).await?;
                Ok(())
            },
            |_| updates += 1,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StartupError::Asset(_)));
    assert!(err.to_string().contains("missing.png"));
    assert_eq!(updates, 0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_context_drawing_outside_systems() {
    let platform = HeadlessPlatform::new(30.0).with_surface("game");
    let log = platform.draw_log("game").unwrap();
    let config = LoopConfig::new("game", 64, 64).with_max_frames(3);

    let stats = engine_app::GameLoop::new(platform, config)
        .run(
            async |surface: &mut HeadlessSurface| {
                if let Some(ctx) = surface.context() {
                    ctx.fill_rect(0.0, 0.0, 64.0, 64.0, "black");
                }
                Ok(())
            },
            |_| {},
            |ctx, frame| ctx.fill_rect(frame.index as f64, 0.0, 1.0, 1.0, "white"),
        )
        .await
        .unwrap();

    assert_eq!(stats.frames, 3);
    assert!(stats.sim_rate >= 30.0);
    // The init fill plus one rect per frame; nothing clears.
    assert_eq!(log.len(), 4);
}

//! # engine_ecs
//!
//! The ECS runtime proper: a [`World`] holding component definitions,
//! system definitions, and entity instances, plus the per-tick dispatcher
//! that runs every system against every matching entity.
//!
//! ## Tick semantics
//!
//! [`World::run_tick`] runs systems strictly in registration order. A system's
//! action mutates the matched bundles in place, and those mutations are
//! visible to every later system in the same tick. There is no staging or
//! deferred apply step.
//!
//! ```rust
//! use engine_component::{Spawn, props};
//! use engine_ecs::{ArgBundle, World};
//! use serde_json::json;
//!
//! let mut world = World::new();
//! let position = world.define_component(props(json!({"x": 0.0, "y": 0.0})));
//! world
//!     .define_system(&["dt"], &[position], |args, bundles| {
//!         let dt = args.get::<f64>(0).copied().unwrap_or(0.0);
//!         let x = bundles[0]["x"].as_f64().unwrap_or(0.0);
//!         bundles[0].insert("x".into(), json!(x + 10.0 * dt));
//!     })
//!     .unwrap();
//! world.spawn([Spawn::Default(position)]).unwrap();
//!
//! let mut args = ArgBundle::new().with("dt", 0.5_f64);
//! world.run_tick(&mut args);
//! ```

pub mod args;
pub mod dispatch;
pub mod error;
pub mod system;
pub mod world;

pub use args::{ArgBundle, Args};
pub use dispatch::TickStats;
pub use error::WorldError;
pub use system::{SystemDef, SystemId};
pub use world::World;

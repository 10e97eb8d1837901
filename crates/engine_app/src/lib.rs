//! # engine_app
//!
//! Runs an [`engine_ecs::World`] against a drawing surface.
//!
//! - [`GameLoop`]: the dual-cadence scheduler. A fixed-rate simulation timer
//!   and a per-refresh render callback share one task.
//! - [`Engine`]: wires a world onto the loop, ticking it once per display
//!   refresh with `dt`, `t`, `input` and `ctx` arguments.
//! - [`Platform`]: what a host must provide (surface, refreshes, input).
//!   [`HeadlessPlatform`] is a timer-driven implementation with no display.
//! - [`load_batch`]: all-or-nothing concurrent asset loading.

pub mod assets;
pub mod config;
pub mod engine;
pub mod error;
pub mod headless;
pub mod platform;
pub mod scheduler;

pub use assets::{load_batch, load_files};
pub use config::{FALLBACK_SIM_RATE, LoopConfig};
pub use engine::{ARG_CTX, ARG_DT, ARG_INPUT, ARG_TIME, Engine};
pub use error::{AssetError, ConfigError, StartupError};
pub use headless::{
    DrawCommand, DrawLog, HeadlessPlatform, HeadlessSurface, InputLog, RecordingContext,
};
pub use platform::{DrawContext, Platform, PlatformEvent, Surface};
pub use scheduler::{ContextOf, Frame, GameLoop, LoopStats, Started};

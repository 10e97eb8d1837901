//! # engine_component
//!
//! The data model of the ECS runtime: what a component is, what an entity
//! holds, and how an entity's bundles are built from component defaults.
//!
//! This crate provides:
//!
//! - [`ComponentId`]: identity of a component definition within one world.
//! - [`ComponentDef`]: a component's identity plus its default [`Props`].
//! - [`Entity`]: generation-checked handle to a spawned entity.
//! - [`EntityInstance`]: the ordered `(ComponentId, Props)` pairs of one entity.
//! - [`Spawn`]: one item of an entity spawn list (defaults or overrides).

pub mod component;
pub mod entity;

pub use component::{ComponentDef, ComponentId, Props, overlay, props};
pub use entity::{Entity, EntityInstance, Spawn};

//! Registry error types.

use engine_component::{ComponentId, Entity};

/// Errors raised when the world is asked to do something inconsistent.
///
/// Dispatch itself never returns these: a missing bundle during dispatch is
/// a broken invariant and panics instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The component id was not defined by this world.
    #[error("unknown component: {0}")]
    UnknownComponent(ComponentId),

    /// A spawn list or system requirement names the same component twice.
    #[error("component listed more than once: {0}")]
    DuplicateComponent(ComponentId),

    /// The entity handle refers to a despawned entity.
    #[error("stale entity handle: {0}")]
    StaleEntity(Entity),
}

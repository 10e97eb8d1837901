//! Entity handles, entity instances, and spawn items.
//!
//! An [`Entity`] is a lightweight handle; the data lives in an
//! [`EntityInstance`] owned by the world. Handles carry a generation so that
//! a handle to a despawned entity is detected instead of silently reading
//! whatever occupies the slot later.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::{ComponentDef, ComponentId, Props};

/// A generation-checked entity handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Create a handle from its raw parts.
    #[must_use]
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index in the world's entity sequence.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the generation this handle was issued with.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

/// One item of a spawn list.
#[derive(Debug, Clone)]
pub enum Spawn {
    /// Use the component's defaults as-is (copied fresh).
    Default(ComponentId),
    /// Shallow-merge the overrides over the component's defaults.
    With(ComponentId, Props),
}

impl Spawn {
    /// Returns the component this item refers to.
    #[must_use]
    pub fn component(&self) -> ComponentId {
        match self {
            Spawn::Default(id) | Spawn::With(id, _) => *id,
        }
    }

    /// Returns the overrides, if any.
    #[must_use]
    pub fn overrides(&self) -> Option<&Props> {
        match self {
            Spawn::Default(_) => None,
            Spawn::With(_, overrides) => Some(overrides),
        }
    }
}

impl From<ComponentId> for Spawn {
    fn from(id: ComponentId) -> Self {
        Spawn::Default(id)
    }
}

impl From<(ComponentId, Props)> for Spawn {
    fn from((id, overrides): (ComponentId, Props)) -> Self {
        Spawn::With(id, overrides)
    }
}

/// The data of one entity: an ordered list of `(ComponentId, Props)` pairs.
///
/// At most one bundle per component id. The world enforces that on spawn;
/// [`EntityInstance::insert`] enforces it for direct construction.
#[derive(Debug, Clone, Default)]
pub struct EntityInstance {
    components: Vec<(ComponentId, Props)>,
}

impl EntityInstance {
    /// Create an entity that owns no components.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Attach a bundle built from `def` and `overrides`.
    ///
    /// Returns `false` and leaves the instance untouched if the component is
    /// already present.
    pub fn insert(&mut self, def: &ComponentDef, overrides: Option<&Props>) -> bool {
        if self.has(def.id()) {
            return false;
        }
        self.components.push((def.id(), def.instantiate(overrides)));
        true
    }

    /// Returns `true` if this entity owns the component.
    #[must_use]
    pub fn has(&self, id: ComponentId) -> bool {
        self.components.iter().any(|(owned, _)| *owned == id)
    }

    /// Returns `true` if this entity owns every component in `required`.
    #[must_use]
    pub fn has_all(&self, required: &[ComponentId]) -> bool {
        required.iter().all(|id| self.has(*id))
    }

    /// Returns the bundle for a component.
    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<&Props> {
        self.components
            .iter()
            .find(|(owned, _)| *owned == id)
            .map(|(_, props)| props)
    }

    /// Returns the bundle for a component, mutably.
    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Props> {
        self.components
            .iter_mut()
            .find(|(owned, _)| *owned == id)
            .map(|(_, props)| props)
    }

    /// Borrow the bundles for `required`, in `required` order.
    ///
    /// Slots for components this entity does not own are `None`. `required`
    /// must not name the same component twice; a repeated id fills only its
    /// first slot.
    pub fn bundles_mut(&mut self, required: &[ComponentId]) -> Vec<Option<&mut Props>> {
        let mut slots: Vec<Option<&mut Props>> = required.iter().map(|_| None).collect();
        for (owned, props) in &mut self.components {
            if let Some(pos) = required.iter().position(|id| *id == *owned) {
                slots[pos] = Some(props);
            }
        }
        slots
    }

    /// Returns the ids of owned components, in attachment order.
    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.iter().map(|(id, _)| *id)
    }

    /// Returns the number of owned components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the entity owns no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

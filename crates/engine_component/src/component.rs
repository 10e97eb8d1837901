//! Component definitions and property bundles.
//!
//! A [`ComponentDef`] is both a type tag and a template: its [`ComponentId`]
//! is what systems filter on, and its default [`Props`] seed every bundle an
//! entity gets for it.
//!
//! ## Identity
//!
//! [`ComponentId`] is allocated by the world in definition order. Two
//! definitions with identical defaults still receive distinct ids; equality
//! of defaults is never consulted when matching entities against systems.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A property bundle: the live data backing one entity's use of one component.
///
/// Bundles are arbitrarily shaped. The ECS core never looks inside them; only
/// system actions do.
pub type Props = Map<String, Value>;

/// The identity of a component definition.
///
/// An id pairs the defining world's tag with the component's index in that
/// world's definition order. A world rejects ids carrying another world's
/// tag, so an id cannot silently alias a foreign definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    world: u32,
    index: u32,
}

impl ComponentId {
    /// Create an id from its raw parts. Worlds allocate ids themselves; this
    /// exists for registries and tests.
    #[must_use]
    pub const fn from_raw_parts(world: u32, index: u32) -> Self {
        Self { world, index }
    }

    /// Returns the tag of the world that issued this id.
    #[must_use]
    pub const fn world(self) -> u32 {
        self.world
    }

    /// Returns the position of this component in its world's definition order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.index)
    }
}

/// A component definition: identity plus default property bundle.
///
/// Immutable after creation. Entities never hold a reference to `defaults`;
/// they receive copies (see [`overlay`]).
#[derive(Debug, Clone)]
pub struct ComponentDef {
    id: ComponentId,
    defaults: Props,
}

impl ComponentDef {
    /// Create a definition with the given identity and defaults.
    #[must_use]
    pub fn new(id: ComponentId, defaults: Props) -> Self {
        Self { id, defaults }
    }

    /// Returns this definition's identity.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Returns the default property bundle.
    #[must_use]
    pub fn defaults(&self) -> &Props {
        &self.defaults
    }

    /// Build a fresh bundle for an entity: the defaults with `overrides`
    /// shallow-merged on top.
    #[must_use]
    pub fn instantiate(&self, overrides: Option<&Props>) -> Props {
        match overrides {
            Some(overrides) => overlay(&self.defaults, overrides),
            None => self.defaults.clone(),
        }
    }
}

/// Shallow-merge `overrides` over `defaults` into a new bundle.
///
/// Override keys replace default keys wholesale (nested objects are not
/// merged); default keys absent from the override are kept. Keys present
/// only in the override are added. Neither input is modified.
#[must_use]
pub fn overlay(defaults: &Props, overrides: &Props) -> Props {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Convert a JSON object literal into [`Props`].
///
/// Non-object values yield an empty bundle.
#[must_use]
pub fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => Props::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_overlay_replaces_and_keeps_keys() {
        let defaults = props(json!({"x": 0, "y": 0}));
        let overrides = props(json!({"x": 5}));
        let merged = overlay(&defaults, &overrides);
        assert_eq!(Value::Object(merged), json!({"x": 5, "y": 0}));
    }

    #[test]
    fn test_overlay_adds_new_keys() {
        let defaults = props(json!({"x": 0}));
        let overrides = props(json!({"fps": 16}));
        let merged = overlay(&defaults, &overrides);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["fps"], 16);
    }

    #[test]
    fn test_overlay_is_shallow() {
        let defaults = props(json!({"size": {"w": 1, "h": 2}}));
        let overrides = props(json!({"size": {"w": 8}}));
        let merged = overlay(&defaults, &overrides);
        assert_eq!(merged["size"], json!({"w": 8}));
    }

    #[test]
    fn test_instantiate_does_not_touch_defaults() {
        let def = ComponentDef::new(ComponentId::from_raw_parts(0, 0), props(json!({"x": 0, "y": 0})));
        let mut bundle = def.instantiate(Some(&props(json!({"x": 5}))));
        bundle.insert("y".into(), json!(99));
        assert_eq!(Value::Object(def.defaults().clone()), json!({"x": 0, "y": 0}));
    }

    #[test]
    fn test_props_from_non_object() {
        assert!(props(json!(3)).is_empty());
    }
}

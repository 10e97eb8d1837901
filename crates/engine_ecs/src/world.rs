//! The world: registry of components, systems, and entities.
//!
//! Components and systems are append-only and keep insertion order. Live
//! entities are kept in spawn order as well; despawning one removes it from
//! that sequence without disturbing the others.
//!
//! Entity handles index a slot table. A despawned entity's slot goes on a
//! free list with its generation bumped, so the next spawn reuses it while
//! every handle issued for the old occupant is rejected as stale.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use engine_component::{ComponentDef, ComponentId, Entity, EntityInstance, Props, Spawn};
use tracing::debug;

use crate::args::Args;
use crate::error::WorldError;
use crate::system::{SystemDef, SystemId};

static NEXT_WORLD_ID: AtomicU32 = AtomicU32::new(0);

/// A live entity in spawn order.
#[derive(Debug)]
pub(crate) struct EntityRecord {
    pub(crate) entity: Entity,
    pub(crate) instance: EntityInstance,
}

/// One slot of the handle table.
#[derive(Debug)]
struct EntitySlot {
    generation: u32,
    /// Position in `World::entities` while occupied.
    live: Option<usize>,
}

/// The ECS world: the single registry a running simulation works against.
///
/// Created explicitly at startup and passed by reference to whoever spawns
/// entities or dispatches ticks.
#[derive(Debug)]
pub struct World {
    id: u32,
    pub(crate) components: Vec<ComponentDef>,
    pub(crate) systems: Vec<SystemDef>,
    pub(crate) entities: Vec<EntityRecord>,
    slots: Vec<EntitySlot>,
    free: Vec<u32>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed),
            components: Vec::new(),
            systems: Vec::new(),
            entities: Vec::new(),
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    // -- Components --

    /// Define a new component with the given default bundle.
    ///
    /// Every call yields a fresh identity, even for identical defaults.
    pub fn define_component(&mut self, defaults: Props) -> ComponentId {
        let id = ComponentId::from_raw_parts(self.id, self.components.len() as u32);
        self.components.push(ComponentDef::new(id, defaults));
        debug!(component = %id, "defined component");
        id
    }

    /// Returns a component definition by id, or `None` if the id was not
    /// issued by this world.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&ComponentDef> {
        if id.world() != self.id {
            return None;
        }
        self.components.get(id.index())
    }

    /// Returns all component definitions, in definition order.
    #[must_use]
    pub fn components(&self) -> &[ComponentDef] {
        &self.components
    }

    // -- Systems --

    /// Register a system named after its registration index.
    ///
    /// See [`World::define_named_system`].
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownComponent`] or
    /// [`WorldError::DuplicateComponent`] if `comps` is not a list of
    /// distinct components defined by this world.
    pub fn define_system<F>(
        &mut self,
        reqs: &[&str],
        comps: &[ComponentId],
        action: F,
    ) -> Result<SystemId, WorldError>
    where
        F: FnMut(&mut Args<'_, '_>, &mut [&mut Props]) + 'static,
    {
        let name = format!("system-{}", self.systems.len());
        self.define_named_system(name, reqs, comps, action)
    }

    /// Register a system.
    ///
    /// `reqs` are argument keys resolved against each tick's bundle; `comps`
    /// are the components an entity must own to be passed to `action`, in
    /// the order its bundles are delivered. Systems run in the order they
    /// are registered.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownComponent`] or
    /// [`WorldError::DuplicateComponent`] if `comps` is not a list of
    /// distinct components defined by this world.
    pub fn define_named_system<F>(
        &mut self,
        name: impl Into<String>,
        reqs: &[&str],
        comps: &[ComponentId],
        action: F,
    ) -> Result<SystemId, WorldError>
    where
        F: FnMut(&mut Args<'_, '_>, &mut [&mut Props]) + 'static,
    {
        self.check_component_list(comps.iter().copied())?;

        let id = SystemId(self.systems.len() as u32);
        let system = SystemDef {
            id,
            name: name.into(),
            reqs: reqs.iter().map(|r| (*r).to_string()).collect(),
            comps: comps.to_vec(),
            action: Box::new(action),
        };
        debug!(
            system = %id,
            name = %system.name,
            reqs = ?system.reqs,
            comps = system.comps.len(),
            "defined system"
        );
        self.systems.push(system);
        Ok(id)
    }

    /// Returns all systems, in registration (execution) order.
    #[must_use]
    pub fn systems(&self) -> &[SystemDef] {
        &self.systems
    }

    // -- Entities --

    /// Spawn an entity from a list of components with optional overrides.
    ///
    /// Each bundle is a fresh copy of the component's defaults with the
    /// overrides shallow-merged on top; no bundle aliases the stored
    /// defaults or another entity's bundle. An empty list spawns an entity
    /// that owns no components. The new entity comes last in spawn order,
    /// even when it reuses a freed slot.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownComponent`] or
    /// [`WorldError::DuplicateComponent`]; nothing is spawned in that case.
    pub fn spawn<I>(&mut self, items: I) -> Result<Entity, WorldError>
    where
        I: IntoIterator,
        I::Item: Into<Spawn>,
    {
        let items: Vec<Spawn> = items.into_iter().map(Into::into).collect();
        self.check_component_list(items.iter().map(Spawn::component))?;

        let mut instance = EntityInstance::new();
        for item in &items {
            let def = &self.components[item.component().index()];
            instance.insert(def, item.overrides());
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(EntitySlot {
                    generation: 0,
                    live: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.live = Some(self.entities.len());
        let entity = Entity::from_raw_parts(index, slot.generation);

        debug!(%entity, components = instance.len(), "spawned entity");
        self.entities.push(EntityRecord { entity, instance });
        Ok(entity)
    }

    /// Remove an entity and return its data. The remaining entities keep
    /// their relative order; the handle (and any copy of it) becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StaleEntity`] if the entity is already gone.
    pub fn despawn(&mut self, entity: Entity) -> Result<EntityInstance, WorldError> {
        let position = self.position(entity)?;
        let record = self.entities.remove(position);
        for later in &self.entities[position..] {
            if let Some(live) = self.slots[later.entity.index()].live.as_mut() {
                *live -= 1;
            }
        }

        let slot = &mut self.slots[entity.index()];
        slot.live = None;
        // A slot whose generation would wrap is retired instead of reused.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(entity.index() as u32);
        }
        debug!(%entity, "despawned entity");
        Ok(record.instance)
    }

    /// Returns `true` if the handle refers to a live entity.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        self.position(entity).is_ok()
    }

    /// Returns a live entity's data.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StaleEntity`] if the entity was despawned.
    pub fn entity(&self, entity: Entity) -> Result<&EntityInstance, WorldError> {
        let position = self.position(entity)?;
        Ok(&self.entities[position].instance)
    }

    /// Returns a live entity's data mutably.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StaleEntity`] if the entity was despawned.
    pub fn entity_mut(&mut self, entity: Entity) -> Result<&mut EntityInstance, WorldError> {
        let position = self.position(entity)?;
        Ok(&mut self.entities[position].instance)
    }

    /// Returns every live entity with its data, in spawn order.
    pub fn entities(&self) -> impl Iterator<Item = (Entity, &EntityInstance)> {
        self.entities
            .iter()
            .map(|record| (record.entity, &record.instance))
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the live entities owning every component in `required`, in
    /// spawn order. This is the same filter the dispatcher applies.
    #[must_use]
    pub fn query(&self, required: &[ComponentId]) -> Vec<Entity> {
        self.entities()
            .filter(|(_, instance)| instance.has_all(required))
            .map(|(entity, _)| entity)
            .collect()
    }

    // -- Validation --

    fn position(&self, entity: Entity) -> Result<usize, WorldError> {
        self.slots
            .get(entity.index())
            .filter(|slot| slot.generation == entity.generation())
            .and_then(|slot| slot.live)
            .ok_or(WorldError::StaleEntity(entity))
    }

    fn check_component_list(
        &self,
        ids: impl Iterator<Item = ComponentId>,
    ) -> Result<(), WorldError> {
        let mut seen = HashSet::new();
        for id in ids {
            if self.component(id).is_none() {
                return Err(WorldError::UnknownComponent(id));
            }
            if !seen.insert(id) {
                return Err(WorldError::DuplicateComponent(id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use engine_component::props;
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_identical_defaults_get_distinct_ids() {
        let mut world = World::new();
        let a = world.define_component(props(json!({"x": 0})));
        let b = world.define_component(props(json!({"x": 0})));
        assert_ne!(a, b);
        assert_eq!(world.components().len(), 2);
    }

    #[test]
    fn test_entity_with_c1_never_matches_c2() {
        let mut world = World::new();
        let c1 = world.define_component(props(json!({"v": 1})));
        let c2 = world.define_component(props(json!({"v": 1})));
        world.spawn([c1]).unwrap();
        assert!(world.query(&[c2]).is_empty());
        assert_eq!(world.query(&[c1]).len(), 1);
    }

    #[test]
    fn test_spawn_overlays_defaults() {
        let mut world = World::new();
        let c = world.define_component(props(json!({"x": 0, "y": 0})));
        let e = world.spawn([Spawn::With(c, props(json!({"x": 5})))]).unwrap();
        let bundle = world.entity(e).unwrap().get(c).unwrap();
        assert_eq!(Value::Object(bundle.clone()), json!({"x": 5, "y": 0}));
    }

    #[test]
    fn test_spawn_copies_are_independent() {
        let mut world = World::new();
        let c = world.define_component(props(json!({"x": 0, "items": [1]})));
        let e1 = world.spawn([c]).unwrap();
        let e2 = world.spawn([c]).unwrap();

        world
            .entity_mut(e1)
            .unwrap()
            .get_mut(c)
            .unwrap()
            .insert("x".into(), json!(42));

        assert_eq!(world.entity(e2).unwrap().get(c).unwrap()["x"], 0);
        assert_eq!(world.component(c).unwrap().defaults()["x"], 0);
    }

    #[test]
    fn test_spawn_rejects_duplicates() {
        let mut world = World::new();
        let c = world.define_component(Props::new());
        let err = world.spawn([c, c]).unwrap_err();
        assert_eq!(err, WorldError::DuplicateComponent(c));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_spawn_rejects_unknown_component() {
        let mut world = World::new();
        let forged = ComponentId::from_raw_parts(u32::MAX, 9);
        let err = world.spawn([forged]).unwrap_err();
        assert_eq!(err, WorldError::UnknownComponent(forged));
    }

    #[test]
    fn test_component_from_other_world_is_unknown() {
        let mut first = World::new();
        let mut second = World::new();
        let foreign = first.define_component(props(json!({"hp": 10})));
        let local = second.define_component(props(json!({"x": 0})));
        // Same index, different world.
        assert_eq!(foreign.index(), local.index());

        assert!(second.component(foreign).is_none());
        assert_eq!(
            second.spawn([foreign]).unwrap_err(),
            WorldError::UnknownComponent(foreign)
        );
        assert_eq!(
            second.define_system(&[], &[foreign], |_, _| {}).unwrap_err(),
            WorldError::UnknownComponent(foreign)
        );
    }

    #[test]
    fn test_empty_spawn_owns_nothing() {
        let mut world = World::new();
        let c = world.define_component(Props::new());
        let e = world.spawn(Vec::<Spawn>::new()).unwrap();
        assert!(world.entity(e).unwrap().is_empty());
        assert!(world.query(&[c]).is_empty());
        // The empty requirement matches everything.
        assert_eq!(world.query(&[]), vec![e]);
    }

    #[test]
    fn test_query_is_superset_match() {
        let mut world = World::new();
        let a = world.define_component(Props::new());
        let b = world.define_component(Props::new());
        let c = world.define_component(Props::new());
        let d = world.define_component(Props::new());
        let e = world.spawn([a, b, c]).unwrap();

        assert_eq!(world.query(&[a, b]), vec![e]);
        assert_eq!(world.query(&[a, b, c]), vec![e]);
        assert!(world.query(&[a, b, d]).is_empty());
    }

    #[test]
    fn test_define_system_validates_components() {
        let mut world = World::new();
        let a = world.define_component(Props::new());
        assert_eq!(
            world.define_system(&[], &[a, a], |_, _| {}).unwrap_err(),
            WorldError::DuplicateComponent(a)
        );
        let forged = ComponentId::from_raw_parts(u32::MAX, 3);
        assert_eq!(
            world.define_system(&[], &[forged], |_, _| {}).unwrap_err(),
            WorldError::UnknownComponent(forged)
        );
        assert!(world.systems().is_empty());
    }

    #[test]
    fn test_systems_keep_registration_order() {
        let mut world = World::new();
        let a = world.define_component(Props::new());
        world
            .define_named_system("physics", &["dt"], &[a], |_, _| {})
            .unwrap();
        world.define_system(&[], &[], |_, _| {}).unwrap();
        let names: Vec<&str> = world.systems().iter().map(SystemDef::name).collect();
        assert_eq!(names, vec!["physics", "system-1"]);
        assert_eq!(world.systems()[0].reqs(), ["dt".to_string()]);
    }

    #[test]
    fn test_despawn_invalidates_handle() {
        let mut world = World::new();
        let c = world.define_component(Props::new());
        let e1 = world.spawn([c]).unwrap();
        let e2 = world.spawn([c]).unwrap();

        assert!(world.despawn(e1).is_ok());
        assert!(!world.exists(e1));
        assert_eq!(world.despawn(e1).unwrap_err(), WorldError::StaleEntity(e1));
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.query(&[c]), vec![e2]);
    }

    #[test]
    fn test_spawn_after_despawn_keeps_order() {
        let mut world = World::new();
        let c = world.define_component(Props::new());
        let e1 = world.spawn([c]).unwrap();
        let e2 = world.spawn([c]).unwrap();
        world.despawn(e1).unwrap();
        let e3 = world.spawn([c]).unwrap();
        assert_ne!(e3, e1);
        assert_eq!(world.query(&[c]), vec![e2, e3]);
    }

    #[test]
    fn test_freed_slot_is_reused_with_new_generation() {
        let mut world = World::new();
        let c = world.define_component(props(json!({"n": 1})));
        let old = world.spawn([c]).unwrap();
        world.despawn(old).unwrap();

        let new = world.spawn([c]).unwrap();
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(world.exists(new));
        assert!(!world.exists(old));
        assert_eq!(world.entity(old).unwrap_err(), WorldError::StaleEntity(old));
        assert_eq!(world.despawn(old).unwrap_err(), WorldError::StaleEntity(old));
    }

    #[test]
    fn test_spawn_despawn_cycles_do_not_grow() {
        let mut world = World::new();
        let c = world.define_component(Props::new());
        let keeper = world.spawn([c]).unwrap();
        for _ in 0..10_000 {
            let e = world.spawn([c]).unwrap();
            world.despawn(e).unwrap();
        }
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.slots.len(), 2);
        assert_eq!(world.entities.len(), 1);
        assert!(world.exists(keeper));
    }

    #[test]
    fn test_despawn_from_middle_keeps_lookups() {
        let mut world = World::new();
        let c = world.define_component(props(json!({"id": 0})));
        let ids: Vec<Entity> = (0..4)
            .map(|i| world.spawn([Spawn::With(c, props(json!({"id": i})))]).unwrap())
            .collect();
        world.despawn(ids[1]).unwrap();

        assert_eq!(world.query(&[c]), vec![ids[0], ids[2], ids[3]]);
        for (n, e) in ids.iter().enumerate().filter(|(n, _)| *n != 1) {
            assert_eq!(world.entity(*e).unwrap().get(c).unwrap()["id"], json!(n));
        }
    }
}

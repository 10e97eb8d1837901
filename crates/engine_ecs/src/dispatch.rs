//! Per-tick dispatch.
//!
//! One tick runs every system once, in registration order:
//!
//! 1. Resolve the system's argument keys against the tick's [`ArgBundle`].
//! 2. Select the live entities owning all of the system's components.
//! 3. Borrow each selected entity's bundles in the system's declared order.
//! 4. Call the action with the arguments and bundles.
//!
//! Mutations land directly in the entity bundles, so a later system (or a
//! later entity within the same system) observes them immediately.

use tracing::{debug, trace};

use crate::args::{ArgBundle, Args};
use crate::world::World;

/// Summary of one [`World::run_tick`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Number of systems run.
    pub systems: usize,
    /// Number of action invocations across all systems.
    pub invocations: usize,
}

impl World {
    /// Run every system once against the current entities.
    ///
    /// Argument keys a system declared but `args` lacks resolve to `None`
    /// inside the action. Panics raised by an action are not caught.
    ///
    /// # Panics
    ///
    /// Panics if an entity that passed the component filter has no bundle
    /// for one of the required components. That cannot happen through the
    /// public API and indicates a corrupted entity.
    pub fn run_tick(&mut self, args: &mut ArgBundle<'_>) -> TickStats {
        let mut stats = TickStats::default();
        let entities = &mut self.entities;

        for system in &mut self.systems {
            let mut resolved = Args::new(&mut *args, &system.reqs);
            let mut invocations = 0usize;

            for record in entities.iter_mut() {
                let entity = record.entity;
                let instance = &mut record.instance;
                if !instance.has_all(&system.comps) {
                    continue;
                }

                let mut bundles: Vec<_> = instance
                    .bundles_mut(&system.comps)
                    .into_iter()
                    .zip(&system.comps)
                    .map(|(bundle, component)| {
                        bundle.unwrap_or_else(|| {
                            panic!(
                                "dispatch invariant violated: {entity} matched system \
                                 '{}' but has no bundle for {component}",
                                system.name
                            )
                        })
                    })
                    .collect();

                (system.action)(&mut resolved, bundles.as_mut_slice());
                invocations += 1;
            }

            trace!(system = %system.name, invocations, "system ran");
            stats.systems += 1;
            stats.invocations += invocations;
        }

        debug!(
            systems = stats.systems,
            invocations = stats.invocations,
            args = args.len(),
            "tick dispatched"
        );
        stats
    }
}

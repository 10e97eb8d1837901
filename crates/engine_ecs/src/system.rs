//! System definitions.
//!
//! A system is a query (the components it requires), the external
//! arguments it reads, and an action run once per matching entity per tick.

use std::fmt;

use engine_component::{ComponentId, Props};

use crate::args::Args;

/// The action of a system.
///
/// Receives the resolved external arguments and the matched bundles, in the
/// order the system declared its components. Mutating the bundles is the
/// action's only effect on the world.
pub type Action = dyn FnMut(&mut Args<'_, '_>, &mut [&mut Props]);

/// Identity of a registered system: its position in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub u32);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "System({})", self.0)
    }
}

/// A registered system. Immutable once created.
pub struct SystemDef {
    pub(crate) id: SystemId,
    pub(crate) name: String,
    pub(crate) reqs: Vec<String>,
    pub(crate) comps: Vec<ComponentId>,
    pub(crate) action: Box<Action>,
}

impl SystemDef {
    /// Returns this system's identity.
    #[must_use]
    pub fn id(&self) -> SystemId {
        self.id
    }

    /// Returns the system's human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the external argument keys, in declared order.
    #[must_use]
    pub fn reqs(&self) -> &[String] {
        &self.reqs
    }

    /// Returns the required components, in declared (delivery) order.
    #[must_use]
    pub fn comps(&self) -> &[ComponentId] {
        &self.comps
    }
}

impl fmt::Debug for SystemDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("reqs", &self.reqs)
            .field("comps", &self.comps)
            .finish_non_exhaustive()
    }
}

//! Naming and identity shared by every part of a machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Anything in a state machine that carries a name: states, machines,
/// transitions and transition arguments.
///
/// Names are expected to be unique within their containing scope (one
/// state's transitions, one machine's defined states, one transition's
/// arguments). This is not enforced globally.
pub trait Artifact {
    /// Get the artifact's name for display/logging.
    fn name(&self) -> &str;
}

/// Handle to a state (or machine) stored in a [`StateGraph`].
///
/// Ids are cheap to copy and compare. They carry the id of the graph that
/// issued them, so a handle from one graph is never mistaken for a state of
/// another.
///
/// [`StateGraph`]: crate::machine::StateGraph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId {
    graph: Uuid,
    index: usize,
}

impl StateId {
    pub(crate) fn new(graph: Uuid, index: usize) -> Self {
        Self { graph, index }
    }

    pub(crate) fn graph(&self) -> Uuid {
        self.graph
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

//! Builder API for ergonomic transition construction.
//!
//! This module provides a fluent builder and shorthand constructors for
//! transitions, so topologies can be declared with minimal boilerplate.

pub mod error;
pub mod transition;

pub use error::BuildError;
pub use transition::TransitionBuilder;

use crate::core::{StateId, Transition};

/// Create an unconditional transition without arguments.
///
/// # Example
///
/// ```
/// use matryoshka::builder::simple_transition;
/// use matryoshka::machine::StateGraph;
///
/// let mut graph: StateGraph<()> = StateGraph::new();
/// let start = graph.add_state("start");
/// let end = graph.add_state("end");
///
/// graph
///     .set_transition(simple_transition("finish", start, end))
///     .unwrap();
/// ```
pub fn simple_transition<C>(name: impl Into<String>, from: StateId, to: StateId) -> Transition<C> {
    Transition::new(name, from, to)
}

/// Create a transition with a guard predicate over the context.
///
/// # Example
///
/// ```
/// use matryoshka::builder::guarded_transition;
/// use matryoshka::core::Transition;
/// use matryoshka::machine::StateGraph;
///
/// let mut graph: StateGraph<u32> = StateGraph::new();
/// let lobby = graph.add_state("lobby");
/// let table = graph.add_state("table");
///
/// let transition: Transition<u32> =
///     guarded_transition("sit", lobby, table, |players: &u32| *players < 9);
/// assert!(transition.is_allowed(&3));
/// ```
pub fn guarded_transition<C, F>(
    name: impl Into<String>,
    from: StateId,
    to: StateId,
    guard: F,
) -> Transition<C>
where
    F: Fn(&C) -> bool + Send + Sync + 'static,
{
    Transition::new(name, from, to).when(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Artifact;
    use crate::machine::StateGraph;

    #[test]
    fn simple_transition_builds() {
        let mut graph: StateGraph<()> = StateGraph::new();
        let start = graph.add_state("start");
        let middle = graph.add_state("middle");

        let transition: Transition<()> = simple_transition("go", start, middle);

        assert_eq!(transition.name(), "go");
        assert_eq!(transition.from_state(), start);
        assert_eq!(transition.to_state(), middle);
        assert!(transition.is_allowed(&()));
    }

    #[test]
    fn guarded_transition_respects_guard() {
        let mut graph: StateGraph<bool> = StateGraph::new();
        let start = graph.add_state("start");
        let middle = graph.add_state("middle");

        let transition = guarded_transition("go", start, middle, |open: &bool| *open);

        assert!(transition.is_allowed(&true));
        assert!(!transition.is_allowed(&false));
    }
}

//! Transition views that hide their endpoints.

use crate::core::{ArgumentDescriptor, Artifact, MachineError, StateId, Transition};
use crate::machine::StateGraph;
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// A snapshot of one transition as seen through an
/// [`OpaqueMachine`](super::OpaqueMachine): its name, whether it is allowed
/// and its arguments, but not where it leads.
///
/// Two views are equal when they wrap the same transition (same source
/// state, same name), however they were obtained.
#[derive(Clone, Debug, Serialize)]
pub struct OpaqueTransition {
    #[serde(skip_serializing)]
    source: StateId,
    name: String,
    allowed: bool,
    arguments: Vec<ArgumentDescriptor>,
}

impl OpaqueTransition {
    /// Wrap the transition `name` stored on `state`.
    ///
    /// Fails with `InvalidTopology` if either endpoint is a bare state, since
    /// the opaque machine relies on back-references to move cursors.
    pub fn new<C>(
        graph: &StateGraph<C>,
        state: StateId,
        name: &str,
        context: &C,
    ) -> Result<Self, MachineError> {
        let transition = graph.state(state)?.transition(name)?;
        if let Some(reason) = endpoint_violation(graph, transition)? {
            return Err(MachineError::InvalidTopology { reason });
        }
        Ok(Self::wrap(transition, context))
    }

    pub(crate) fn wrap<C>(transition: &Transition<C>, context: &C) -> Self {
        Self {
            source: transition.from_state(),
            name: transition.name().to_string(),
            allowed: transition.is_allowed(context),
            arguments: transition.arguments().map(|a| a.describe()).collect(),
        }
    }

    /// Whether the guard passed when this view was taken.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Arguments of the transition, in name order.
    pub fn arguments(&self) -> &[ArgumentDescriptor] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// Describe why a transition cannot be wrapped, if it cannot.
pub(crate) fn endpoint_violation<C>(
    graph: &StateGraph<C>,
    transition: &Transition<C>,
) -> Result<Option<String>, MachineError> {
    let from = graph.state(transition.from_state())?;
    let to = graph.state(transition.to_state())?;

    let bare: Vec<&str> = [from, to]
        .into_iter()
        .filter(|n| n.is_bare())
        .map(|n| n.name())
        .collect();
    if bare.is_empty() {
        return Ok(None);
    }

    Ok(Some(format!(
        "transition '{}' connects bare state(s) {}",
        transition.name(),
        bare.join(", ")
    )))
}

impl Artifact for OpaqueTransition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for OpaqueTransition {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl PartialEq for OpaqueTransition {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.name == other.name
    }
}

impl Eq for OpaqueTransition {}

impl Hash for OpaqueTransition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransitionArgument;

    #[test]
    fn bare_endpoints_are_rejected() {
        let mut graph: StateGraph<()> = StateGraph::new();
        let s1 = graph.add_state("s1");
        let bare = graph.add_bare_state("bare");
        graph.set_transition(Transition::new("out", s1, bare)).unwrap();
        graph.set_transition(Transition::new("in", bare, s1)).unwrap();

        for (state, name) in [(s1, "out"), (bare, "in")] {
            assert!(matches!(
                OpaqueTransition::new(&graph, state, name, &()),
                Err(MachineError::InvalidTopology { .. })
            ));
        }
    }

    #[test]
    fn base_endpoints_are_accepted() {
        let mut graph: StateGraph<()> = StateGraph::new();
        let s1 = graph.add_state("s1");
        let s2 = graph.add_state("s2");
        graph.set_transition(Transition::new("go", s1, s2)).unwrap();

        let view = OpaqueTransition::new(&graph, s1, "go", &()).unwrap();
        assert_eq!(view.name(), "go");
        assert!(view.is_allowed());
        assert!(view.arguments().is_empty());
    }

    #[test]
    fn views_of_same_transition_are_equal() {
        let mut graph: StateGraph<bool> = StateGraph::new();
        let s1 = graph.add_state("s1");
        let s2 = graph.add_state("s2");
        graph
            .set_transition(Transition::new("go", s1, s2).when(|open: &bool| *open))
            .unwrap();
        graph.set_transition(Transition::new("go", s2, s1)).unwrap();

        let open = OpaqueTransition::new(&graph, s1, "go", &true).unwrap();
        let closed = OpaqueTransition::new(&graph, s1, "go", &false).unwrap();
        let reverse = OpaqueTransition::new(&graph, s2, "go", &true).unwrap();

        assert_eq!(open, closed);
        assert_ne!(open, reverse);
        assert!(open.is_allowed());
        assert!(!closed.is_allowed());
    }

    #[test]
    fn view_serializes_without_endpoints() {
        let mut graph: StateGraph<()> = StateGraph::new();
        let s1 = graph.add_state("s1");
        let s2 = graph.add_state("s2");
        graph
            .set_transition(
                Transition::new("bet", s1, s2).with_argument(TransitionArgument::<u32>::new("amount")),
            )
            .unwrap();

        let view = OpaqueTransition::new(&graph, s1, "bet", &()).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["name"], "bet");
        assert_eq!(json["arguments"][0]["name"], "amount");
        assert_eq!(json["arguments"][0]["has_value"], false);
        assert!(json.get("source").is_none());
    }
}

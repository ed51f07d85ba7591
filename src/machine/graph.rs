//! Arena holding every state of a topology.

use crate::core::{
    no_such_transition, Artifact, MachineError, StateId, StateKind, StateNode, Transition,
};
use std::collections::BTreeMap;
use tracing::{debug, trace};
use uuid::Uuid;

/// Arena of states and machines, addressed by [`StateId`].
///
/// All states of one topology live in one graph. Machines refer to their
/// sub-states and current state by id, and states refer back to their owning
/// machine by id, so there are no ownership cycles.
///
/// The type parameter `C` is the context that guards read and hooks update.
///
/// # Example
///
/// ```rust
/// use matryoshka::core::Transition;
/// use matryoshka::machine::StateGraph;
///
/// let mut graph: StateGraph<()> = StateGraph::new();
/// let m = graph.add_machine("m");
/// let s1 = graph.add_state("s1");
///
/// graph.define_state(m, s1).unwrap();
/// graph.set_transition(Transition::new("t1", m, s1)).unwrap();
///
/// assert_eq!(graph.current_deep(m).unwrap(), m);
/// graph.set_current(m, s1).unwrap();
/// assert_eq!(graph.current_deep(m).unwrap(), s1);
/// ```
pub struct StateGraph<C> {
    id: Uuid,
    nodes: Vec<StateNode<C>>,
}

impl<C> Default for StateGraph<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> StateGraph<C> {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            nodes: Vec::new(),
        }
    }

    /// Add a plain state.
    pub fn add_state(&mut self, name: impl Into<String>) -> StateId {
        let id = self.next_id();
        self.nodes.push(StateNode::new(id, name.into(), StateKind::Base));
        id
    }

    /// Add a state machine. It starts out pointing at itself.
    pub fn add_machine(&mut self, name: impl Into<String>) -> StateId {
        let id = self.next_id();
        self.nodes.push(StateNode::machine(id, name.into()));
        id
    }

    /// Add a minimal state that never records which machine owns it.
    pub fn add_bare_state(&mut self, name: impl Into<String>) -> StateId {
        let id = self.next_id();
        self.nodes.push(StateNode::new(id, name.into(), StateKind::Bare));
        id
    }

    fn next_id(&self) -> StateId {
        StateId::new(self.id, self.nodes.len())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn state(&self, id: StateId) -> Result<&StateNode<C>, MachineError> {
        if id.graph() != self.id {
            return Err(MachineError::ForeignState);
        }
        self.nodes.get(id.index()).ok_or(MachineError::ForeignState)
    }

    pub fn state_mut(&mut self, id: StateId) -> Result<&mut StateNode<C>, MachineError> {
        if id.graph() != self.id {
            return Err(MachineError::ForeignState);
        }
        self.nodes
            .get_mut(id.index())
            .ok_or(MachineError::ForeignState)
    }

    /// First state with the given name, in insertion order.
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.nodes.iter().find(|n| n.name() == name).map(|n| n.id())
    }

    pub fn states(&self) -> impl Iterator<Item = &StateNode<C>> + '_ {
        self.nodes.iter()
    }

    pub(crate) fn name_of(&self, id: StateId) -> String {
        self.state(id)
            .map(|n| n.name().to_string())
            .unwrap_or_else(|_| id.to_string())
    }

    /// Store a transition on its `from` state, replacing any transition of
    /// the same name there.
    pub fn set_transition(&mut self, transition: Transition<C>) -> Result<(), MachineError> {
        self.state(transition.to_state())?;
        let from = self.state_mut(transition.from_state())?;
        debug!(
            state = from.name(),
            transition = transition.name(),
            "Transition set"
        );
        from.set_transition(transition);
        Ok(())
    }

    /// Store a transition named after its target, `trans_to_<to>`.
    pub fn add_default_transition(
        &mut self,
        from: StateId,
        to: StateId,
    ) -> Result<String, MachineError> {
        let name = format!("trans_to_{}", self.state(to)?.name());
        self.set_transition(Transition::new(name.clone(), from, to))?;
        Ok(name)
    }

    /// Remove a transition from a state.
    pub fn unset_transition(
        &mut self,
        state: StateId,
        name: &str,
    ) -> Result<Transition<C>, MachineError> {
        let removed = self.state_mut(state)?.unset_transition(name)?;
        debug!(state = %state, transition = name, "Transition unset");
        Ok(removed)
    }

    /// Access a stored transition, e.g. to fill in argument values.
    pub fn transition_mut(
        &mut self,
        state: StateId,
        name: &str,
    ) -> Result<&mut Transition<C>, MachineError> {
        self.state_mut(state)?.transition_mut(name)
    }

    /// Check a stored transition's guard and arguments without running it.
    pub fn check_transition(
        &self,
        state: StateId,
        name: &str,
        context: &C,
    ) -> Result<StateId, MachineError> {
        let transition = self.state(state)?.transition(name)?;
        transition.check(context)?;
        Ok(transition.to_state())
    }

    /// Execute a stored transition: check its guard and arguments, then run
    /// the `from` state's leave hook and the `to` state's enter hook.
    ///
    /// No machine cursor moves. Use
    /// [`OpaqueMachine`](crate::opaque::OpaqueMachine) to keep cursors in
    /// step with executed transitions.
    pub fn execute_transition(
        &mut self,
        state: StateId,
        name: &str,
        context: &mut C,
    ) -> Result<StateId, MachineError> {
        self.check_transition(state, name, context)?;
        self.run_hooks(state, name, context)
    }

    /// Run leave/enter hooks of an already checked transition.
    ///
    /// The transition is lifted out of its state while the hooks run, so the
    /// hooks of both endpoints can be borrowed mutably. Both endpoints were
    /// validated by `set_transition`.
    pub(crate) fn run_hooks(
        &mut self,
        state: StateId,
        name: &str,
        context: &mut C,
    ) -> Result<StateId, MachineError> {
        let node = self.state_mut(state)?;
        let transition = node
            .take_transition(name)
            .ok_or_else(|| no_such_transition(node.name(), name))?;
        let to = transition.to_state();

        trace!(transition = name, from = %state, to = %to, "Running hooks");
        self.nodes[state.index()].run_leave(&transition, context);
        self.nodes[to.index()].run_enter(&transition, context);
        self.nodes[state.index()].restore_transition(transition);

        Ok(to)
    }

    /// Every machine's current pointer, keyed by machine.
    pub fn cursors(&self) -> BTreeMap<StateId, StateId> {
        self.nodes
            .iter()
            .filter_map(|n| n.as_machine().map(|c| (n.id(), c.current())))
            .collect()
    }
}

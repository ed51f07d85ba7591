//! States, the machine capability, and enter/leave hooks.
//!
//! A state owns its outgoing transitions. A state machine is a state whose
//! kind carries a [`MachineCursor`]: the set of sub-states it defines and the
//! one it currently points at.

use super::artifact::{Artifact, StateId};
use super::error::MachineError;
use super::transition::Transition;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Behavior run when a state is left or entered through a transition.
///
/// Both methods default to no-ops. Implementors keep whatever bookkeeping
/// they need in `self` and may update the shared context.
///
/// # Example
///
/// ```rust
/// use matryoshka::core::{Artifact, StateHooks, Transition};
///
/// #[derive(Default)]
/// struct LastTaken(Option<String>);
///
/// impl StateHooks<u32> for LastTaken {
///     fn leave(&mut self, via: &Transition<u32>, visits: &mut u32) {
///         self.0 = Some(via.name().to_string());
///         *visits += 1;
///     }
/// }
/// ```
pub trait StateHooks<C>: Send {
    fn enter(&mut self, _via: &Transition<C>, _context: &mut C) {}

    fn leave(&mut self, _via: &Transition<C>, _context: &mut C) {}
}

/// Sub-state bookkeeping of a state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineCursor {
    defined: BTreeSet<StateId>,
    current: StateId,
}

impl MachineCursor {
    fn new(own: StateId) -> Self {
        Self {
            defined: BTreeSet::new(),
            current: own,
        }
    }

    /// States registered on this machine. The machine itself is an implicit
    /// member and is not listed.
    pub fn defined_states(&self) -> &BTreeSet<StateId> {
        &self.defined
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    pub(crate) fn defined_mut(&mut self) -> &mut BTreeSet<StateId> {
        &mut self.defined
    }

    pub(crate) fn point_at(&mut self, state: StateId) {
        self.current = state;
    }
}

/// What kind of state a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateKind {
    /// A plain state that can be registered with a machine.
    Base,
    /// A state machine: a state with sub-states.
    Machine(MachineCursor),
    /// A minimal state without back-reference support. It can be defined on
    /// machines, but never learns which machine owns it.
    Bare,
}

/// A named node in a [`StateGraph`](crate::machine::StateGraph).
pub struct StateNode<C> {
    id: StateId,
    name: String,
    kind: StateKind,
    transitions: BTreeMap<String, Transition<C>>,
    belongs_to: Option<StateId>,
    hooks: Option<Box<dyn StateHooks<C>>>,
    initial: bool,
    final_override: Option<bool>,
}

impl<C> StateNode<C> {
    pub(crate) fn new(id: StateId, name: String, kind: StateKind) -> Self {
        Self {
            id,
            name,
            kind,
            transitions: BTreeMap::new(),
            belongs_to: None,
            hooks: None,
            initial: false,
            final_override: None,
        }
    }

    pub(crate) fn machine(id: StateId, name: String) -> Self {
        Self::new(id, name, StateKind::Machine(MachineCursor::new(id)))
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    /// The machine capability, if this state is a machine.
    pub fn as_machine(&self) -> Option<&MachineCursor> {
        match &self.kind {
            StateKind::Machine(cursor) => Some(cursor),
            _ => None,
        }
    }

    pub(crate) fn machine_mut(&mut self) -> Result<&mut MachineCursor, MachineError> {
        let name = &self.name;
        match &mut self.kind {
            StateKind::Machine(cursor) => Ok(cursor),
            _ => Err(MachineError::NotAMachine {
                state: name.clone(),
            }),
        }
    }

    pub fn is_machine(&self) -> bool {
        self.as_machine().is_some()
    }

    pub fn is_bare(&self) -> bool {
        matches!(self.kind, StateKind::Bare)
    }

    /// The machine this state was defined on, if any.
    pub fn belongs_to(&self) -> Option<StateId> {
        self.belongs_to
    }

    pub(crate) fn set_belongs_to(&mut self, machine: Option<StateId>) {
        if !self.is_bare() {
            self.belongs_to = machine;
        }
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn set_initial(&mut self, initial: bool) -> &mut Self {
        self.initial = initial;
        self
    }

    /// Final unless it has outgoing transitions, or as overridden with
    /// [`StateNode::set_final`].
    pub fn is_final(&self) -> bool {
        self.final_override
            .unwrap_or_else(|| self.transitions.is_empty())
    }

    /// Override finality; `None` restores the default.
    pub fn set_final(&mut self, is_final: Option<bool>) -> &mut Self {
        self.final_override = is_final;
        self
    }

    pub fn set_hooks<H>(&mut self, hooks: H) -> &mut Self
    where
        H: StateHooks<C> + 'static,
    {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// All defined outgoing transitions, by name.
    pub fn transitions(&self) -> &BTreeMap<String, Transition<C>> {
        &self.transitions
    }

    /// Outgoing transitions whose guard currently passes. Computed fresh on
    /// every call.
    pub fn allowed_transitions<'a>(
        &'a self,
        context: &'a C,
    ) -> impl Iterator<Item = &'a Transition<C>> + 'a {
        self.transitions
            .values()
            .filter(move |t| t.is_allowed(context))
    }

    pub fn transition(&self, name: &str) -> Result<&Transition<C>, MachineError> {
        self.transitions
            .get(name)
            .ok_or_else(|| no_such_transition(&self.name, name))
    }

    pub fn transition_mut(&mut self, name: &str) -> Result<&mut Transition<C>, MachineError> {
        let state = &self.name;
        self.transitions
            .get_mut(name)
            .ok_or_else(|| no_such_transition(state, name))
    }

    pub fn has_transition(&self, name: &str) -> bool {
        self.transitions.contains_key(name)
    }

    pub fn has_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }

    pub(crate) fn set_transition(&mut self, transition: Transition<C>) {
        self.transitions
            .insert(transition.name().to_string(), transition);
    }

    pub(crate) fn unset_transition(&mut self, name: &str) -> Result<Transition<C>, MachineError> {
        self.transitions
            .remove(name)
            .ok_or_else(|| no_such_transition(&self.name, name))
    }

    pub(crate) fn take_transition(&mut self, name: &str) -> Option<Transition<C>> {
        self.transitions.remove(name)
    }

    pub(crate) fn restore_transition(&mut self, transition: Transition<C>) {
        self.set_transition(transition);
    }

    pub(crate) fn run_enter(&mut self, via: &Transition<C>, context: &mut C) {
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.enter(via, context);
        }
    }

    pub(crate) fn run_leave(&mut self, via: &Transition<C>, context: &mut C) {
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.leave(via, context);
        }
    }
}

pub(crate) fn no_such_transition(state: &str, transition: &str) -> MachineError {
    MachineError::NoSuchTransition {
        state: state.to_string(),
        transition: transition.to_string(),
    }
}

impl<C> Artifact for StateNode<C> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<C> fmt::Debug for StateNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("transitions", &self.transitions.keys().collect::<Vec<_>>())
            .field("belongs_to", &self.belongs_to)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn node(kind: StateKind) -> (StateNode<()>, StateId) {
        let graph = Uuid::new_v4();
        let id = StateId::new(graph, 0);
        let other = StateId::new(graph, 1);
        (StateNode::new(id, "s1".to_string(), kind), other)
    }

    #[test]
    fn state_without_transitions_is_final() {
        let (mut state, other) = node(StateKind::Base);
        assert!(state.is_final());
        assert!(!state.is_initial());

        state.set_transition(Transition::new("go", state.id(), other));
        assert!(!state.is_final());
        assert!(state.has_transitions());
    }

    #[test]
    fn finality_can_be_overridden() {
        let (mut state, _) = node(StateKind::Base);
        state.set_final(Some(false));
        assert!(!state.is_final());

        state.set_final(None);
        assert!(state.is_final());
    }

    #[test]
    fn set_transition_last_write_wins() {
        let (mut state, other) = node(StateKind::Base);
        state.set_transition(Transition::new("go", state.id(), other));
        state.set_transition(Transition::new("go", state.id(), other).when(|_: &()| false));

        assert_eq!(state.transitions().len(), 1);
        assert_eq!(state.allowed_transitions(&()).count(), 0);
    }

    #[test]
    fn unset_unknown_transition_fails() {
        let (mut state, _) = node(StateKind::Base);
        assert_eq!(
            state.unset_transition("nope").err(),
            Some(MachineError::NoSuchTransition {
                state: "s1".to_string(),
                transition: "nope".to_string(),
            })
        );
    }

    #[test]
    fn allowed_transitions_follow_context() {
        let graph = Uuid::new_v4();
        let id = StateId::new(graph, 0);
        let other = StateId::new(graph, 1);
        let mut state: StateNode<bool> = StateNode::new(id, "s".to_string(), StateKind::Base);
        state.set_transition(Transition::new("always", id, other));
        state.set_transition(Transition::new("when_open", id, other).when(|open: &bool| *open));

        let names = |open: bool| {
            state
                .allowed_transitions(&open)
                .map(|t| t.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(false), vec!["always"]);
        assert_eq!(names(true), vec!["always", "when_open"]);
    }

    #[test]
    fn machine_starts_pointing_at_itself() {
        let graph = Uuid::new_v4();
        let id = StateId::new(graph, 3);
        let machine: StateNode<()> = StateNode::machine(id, "m".to_string());

        let cursor = machine.as_machine().unwrap();
        assert_eq!(cursor.current(), id);
        assert!(cursor.defined_states().is_empty());
    }

    #[test]
    fn bare_state_ignores_back_reference() {
        let (mut bare, other) = node(StateKind::Bare);
        bare.set_belongs_to(Some(other));
        assert_eq!(bare.belongs_to(), None);

        let (mut base, other) = node(StateKind::Base);
        base.set_belongs_to(Some(other));
        assert_eq!(base.belongs_to(), Some(other));
    }

    struct Counter;

    impl StateHooks<usize> for Counter {
        fn enter(&mut self, _via: &Transition<usize>, entered: &mut usize) {
            *entered += 1;
        }
    }

    #[test]
    fn hooks_are_optional() {
        let graph = Uuid::new_v4();
        let id = StateId::new(graph, 0);
        let other = StateId::new(graph, 1);
        let mut state: StateNode<usize> = StateNode::new(id, "s".to_string(), StateKind::Base);
        let via = Transition::new("go", other, id);
        let mut entered = 0;

        state.run_enter(&via, &mut entered);
        state.run_leave(&via, &mut entered);
        assert_eq!(entered, 0);

        state.set_hooks(Counter);
        state.run_enter(&via, &mut entered);
        assert_eq!(entered, 1);

        state.run_leave(&via, &mut entered);
        assert_eq!(entered, 1);
    }
}

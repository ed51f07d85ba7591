//! A root machine behind an encapsulating facade.

use super::history::{TransitionHistory, TransitionRecord};
use super::transition::{endpoint_violation, OpaqueTransition};
use crate::core::{no_such_transition, Artifact, MachineError, StateId, StateNode};
use crate::machine::StateGraph;
use chrono::Utc;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{debug, warn};

/// Wraps a root state machine and hides its topology.
///
/// Callers only see the transitions currently allowed from the innermost
/// active state, by name, and can execute them by name. The opaque machine
/// keeps every cursor from the root down to the active leaf consistent.
///
/// # Example
///
/// ```rust
/// use matryoshka::core::{Transition, TransitionArgument};
/// use matryoshka::machine::StateGraph;
/// use matryoshka::opaque::OpaqueMachine;
///
/// let mut graph: StateGraph<()> = StateGraph::new();
/// let m = graph.add_machine("m");
/// let s1 = graph.add_state("s1");
/// graph.define_state(m, s1).unwrap();
/// graph.set_transition(Transition::new("enter", m, s1)).unwrap();
/// graph
///     .set_transition(
///         Transition::new("back", s1, m).with_argument(TransitionArgument::<i32>::new("n")),
///     )
///     .unwrap();
///
/// let mut machine = OpaqueMachine::new(graph, m, ()).unwrap();
/// machine.execute("enter").unwrap();
///
/// assert!(machine.execute("back").is_err());
/// machine.set_argument("back", "n", 42).unwrap();
/// machine.execute("back").unwrap();
///
/// assert_eq!(machine.history().get_path(), vec!["enter", "back"]);
/// ```
pub struct OpaqueMachine<C> {
    graph: StateGraph<C>,
    root: StateId,
    context: C,
    history: TransitionHistory,
    failed_attempts: HashMap<(StateId, String), usize>,
}

impl<C> OpaqueMachine<C> {
    /// Wrap `root`, which must be a machine of `graph`.
    ///
    /// Every transition in the graph is checked up front; all transitions
    /// touching bare states are reported together as `InvalidTopology`.
    pub fn new(graph: StateGraph<C>, root: StateId, context: C) -> Result<Self, MachineError> {
        let root_node = graph.state(root)?;
        if !root_node.is_machine() {
            return Err(MachineError::InvalidTopology {
                reason: format!("root '{}' is not a state machine", root_node.name()),
            });
        }
        validate_topology(&graph)?;

        Ok(Self {
            graph,
            root,
            context,
            history: TransitionHistory::new(),
            failed_attempts: HashMap::new(),
        })
    }

    /// Name of the wrapped root machine.
    pub fn name(&self) -> &str {
        self.graph
            .state(self.root)
            .map(|n| n.name())
            .unwrap_or_default()
    }

    /// Transitions currently allowed from the innermost active state, keyed
    /// by name. Each call takes a fresh snapshot.
    pub fn transitions(&self) -> BTreeMap<String, OpaqueTransition> {
        let Ok(node) = self.active_node() else {
            return BTreeMap::new();
        };
        node.allowed_transitions(&self.context)
            .map(|t| (t.name().to_string(), OpaqueTransition::wrap(t, &self.context)))
            .collect()
    }

    /// A single allowed transition by name.
    pub fn transition(&self, name: &str) -> Option<OpaqueTransition> {
        self.transitions().remove(name)
    }

    /// Whether the innermost active state is final.
    pub fn is_final(&self) -> bool {
        self.active_node().is_ok_and(|n| n.is_final())
    }

    /// Execute an allowed transition, by name or by view.
    ///
    /// On success the target's owning machine points at the target; a
    /// target that is itself a machine is entered pointing at itself. On
    /// failure no cursor moves and no hook runs.
    pub fn execute(&mut self, transition: impl AsRef<str>) -> Result<&mut Self, MachineError> {
        let name = transition.as_ref();
        let state = self.graph.current_deep(self.root)?;
        let node = self.graph.state(state)?;
        let allowed = node
            .transition(name)
            .is_ok_and(|t| t.is_allowed(&self.context));
        if !allowed {
            return Err(no_such_transition(node.name(), name));
        }

        match self.fire(state, name) {
            Ok(to) => {
                let key = (state, name.to_string());
                let attempt = self.failed_attempts.remove(&key).unwrap_or(0) + 1;
                self.history.push(TransitionRecord {
                    transition: name.to_string(),
                    timestamp: Utc::now(),
                    attempt,
                });
                debug!(
                    machine = self.name(),
                    transition = name,
                    to = %self.graph.name_of(to),
                    attempt,
                    "Transition executed"
                );
                Ok(self)
            }
            Err(err) => {
                *self
                    .failed_attempts
                    .entry((state, name.to_string()))
                    .or_insert(0) += 1;
                Err(err)
            }
        }
    }

    /// Check, resolve the owner, run hooks, then move cursors. Nothing is
    /// mutated until every check has passed.
    fn fire(&mut self, state: StateId, name: &str) -> Result<StateId, MachineError> {
        let to = self.graph.check_transition(state, name, &self.context)?;
        let owner = self.owner_of(to)?;

        self.graph.run_hooks(state, name, &mut self.context)?;
        if self.graph.state(to)?.is_machine() {
            self.graph.set_current(to, to)?;
        }
        self.graph.set_current(owner, to)?;
        Ok(to)
    }

    /// The machine whose cursor must point at `to`: the root if `to` is one
    /// of its own states, otherwise the machine `to` was defined on.
    fn owner_of(&self, to: StateId) -> Result<StateId, MachineError> {
        if self.graph.is_member(self.root, to)? {
            return Ok(self.root);
        }
        match self.graph.belongs_to(to)? {
            Some(owner) => Ok(owner),
            None => {
                let state = self.graph.name_of(to);
                warn!(machine = self.name(), state = %state, "Orphan state rejected");
                Err(MachineError::OrphanState { state })
            }
        }
    }

    /// Fill an argument of a transition defined on the innermost active
    /// state.
    pub fn set_argument<T: Any>(
        &mut self,
        transition: impl AsRef<str>,
        argument: &str,
        value: T,
    ) -> Result<&mut Self, MachineError> {
        let state = self.graph.current_deep(self.root)?;
        self.graph
            .transition_mut(state, transition.as_ref())?
            .argument_mut::<T>(argument)?
            .set_value(value);
        Ok(self)
    }

    /// Clear an argument of a transition defined on the innermost active
    /// state.
    pub fn unset_argument(
        &mut self,
        transition: impl AsRef<str>,
        argument: &str,
    ) -> Result<&mut Self, MachineError> {
        let state = self.graph.current_deep(self.root)?;
        self.graph
            .transition_mut(state, transition.as_ref())?
            .clear_argument(argument)?;
        Ok(self)
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the context guards read, e.g. to remove a player.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// Give back the graph and the context.
    pub fn into_inner(self) -> (StateGraph<C>, C) {
        (self.graph, self.context)
    }

    fn active_node(&self) -> Result<&StateNode<C>, MachineError> {
        let state = self.graph.current_deep(self.root)?;
        self.graph.state(state)
    }
}

/// Every transition must connect states that support back-references.
/// Collects all offenders instead of stopping at the first.
fn validate_topology<C>(graph: &StateGraph<C>) -> Result<(), MachineError> {
    let mut checks: Vec<Validation<(), NonEmptyVec<String>>> = Vec::new();
    for transition in graph.states().flat_map(|n| n.transitions().values()) {
        let check = match endpoint_violation(graph, transition)? {
            Some(reason) => Validation::fail(reason),
            None => Validation::success(()),
        };
        checks.push(check);
    }

    match Validation::all_vec(checks) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(MachineError::InvalidTopology {
            reason: errors.iter().cloned().collect::<Vec<_>>().join("; "),
        }),
    }
}

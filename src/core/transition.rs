//! Transitions: named, guarded edges between two states.

use super::argument::{downcast_mut, downcast_ref, ErasedArgument, TransitionArgument};
use super::artifact::{Artifact, StateId};
use super::error::MachineError;
use super::guard::Guard;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// A directed edge from one state to another.
///
/// The endpoints are fixed at construction. A transition is allowed when its
/// guard (if any) passes; it can only execute when it is allowed and every
/// declared argument holds a value.
///
/// Transitions are stored on their `from` state, see
/// [`StateGraph::set_transition`](crate::machine::StateGraph::set_transition).
pub struct Transition<C> {
    name: String,
    from: StateId,
    to: StateId,
    arguments: BTreeMap<String, Box<dyn ErasedArgument>>,
    guard: Option<Guard<C>>,
}

impl<C> Transition<C> {
    /// Create an unguarded transition without arguments.
    pub fn new(name: impl Into<String>, from: StateId, to: StateId) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            arguments: BTreeMap::new(),
            guard: None,
        }
    }

    /// Attach a guard, replacing any previous one.
    pub fn with_guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attach a guard built from a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.with_guard(Guard::new(predicate))
    }

    /// Attach an argument (chaining form of [`Transition::set_argument`]).
    pub fn with_argument<T: Any + Send + Sync>(mut self, argument: TransitionArgument<T>) -> Self {
        self.set_argument(argument);
        self
    }

    pub fn from_state(&self) -> StateId {
        self.from
    }

    pub fn to_state(&self) -> StateId {
        self.to
    }

    /// Evaluate the guard. Transitions without a guard are always allowed.
    pub fn is_allowed(&self, context: &C) -> bool {
        self.guard.as_ref().is_none_or(|g| g.check(context))
    }

    /// Set or replace an argument by its name.
    pub fn set_argument<T: Any + Send + Sync>(&mut self, argument: TransitionArgument<T>) -> &mut Self {
        self.insert_argument(Box::new(argument))
    }

    pub(crate) fn insert_argument(&mut self, argument: Box<dyn ErasedArgument>) -> &mut Self {
        self.arguments.insert(argument.name().to_string(), argument);
        self
    }

    /// Remove an argument by name.
    pub fn remove_argument(&mut self, name: &str) -> Result<&mut Self, MachineError> {
        match self.arguments.remove(name) {
            Some(_) => Ok(self),
            None => Err(no_such_argument(&self.name, name)),
        }
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// All arguments, in name order.
    pub fn arguments(&self) -> impl Iterator<Item = &dyn ErasedArgument> + '_ {
        self.arguments.values().map(|a| -> &dyn ErasedArgument { a.as_ref() })
    }

    /// Look up an argument and view it as holding a `T`.
    pub fn argument<T: Any>(&self, name: &str) -> Result<&TransitionArgument<T>, MachineError> {
        let argument = self
            .arguments
            .get(name)
            .ok_or_else(|| no_such_argument(&self.name, name))?;
        downcast_ref(argument.as_ref())
    }

    /// Mutable counterpart of [`Transition::argument`], used to fill values.
    pub fn argument_mut<T: Any>(
        &mut self,
        name: &str,
    ) -> Result<&mut TransitionArgument<T>, MachineError> {
        let transition = &self.name;
        let argument = self
            .arguments
            .get_mut(name)
            .ok_or_else(|| no_such_argument(transition, name))?;
        downcast_mut(argument.as_mut())
    }

    /// Clear an argument's value without knowing its type.
    pub fn clear_argument(&mut self, name: &str) -> Result<(), MachineError> {
        let transition = &self.name;
        self.arguments
            .get_mut(name)
            .ok_or_else(|| no_such_argument(transition, name))?
            .clear();
        Ok(())
    }

    /// Name of the first argument (by name order) that has no value.
    pub fn missing_argument(&self) -> Option<&str> {
        self.arguments
            .values()
            .find(|a| !a.has_value())
            .map(|a| a.name())
    }

    /// The gate in front of the leave/enter hooks: the guard must pass and
    /// every argument must be set.
    pub fn check(&self, context: &C) -> Result<(), MachineError> {
        if !self.is_allowed(context) {
            return Err(MachineError::TransitionNotAllowed {
                transition: self.name.clone(),
            });
        }

        if let Some(argument) = self.missing_argument() {
            return Err(MachineError::MissingArgument {
                transition: self.name.clone(),
                argument: argument.to_string(),
            });
        }

        Ok(())
    }
}

fn no_such_argument(transition: &str, argument: &str) -> MachineError {
    MachineError::NoSuchArgument {
        transition: transition.to_string(),
        argument: argument.to_string(),
    }
}

impl<C> Artifact for Transition<C> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("arguments", &self.arguments)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ids() -> (StateId, StateId) {
        let graph = Uuid::new_v4();
        (StateId::new(graph, 0), StateId::new(graph, 1))
    }

    #[test]
    fn unguarded_transition_is_allowed() {
        let (a, b) = ids();
        let transition: Transition<()> = Transition::new("go", a, b);

        assert!(transition.is_allowed(&()));
        assert_eq!(transition.check(&()), Ok(()));
        assert_eq!(transition.from_state(), a);
        assert_eq!(transition.to_state(), b);
    }

    #[test]
    fn guard_blocks_transition() {
        let (a, b) = ids();
        let transition = Transition::new("go", a, b).when(|open: &bool| *open);

        assert!(transition.is_allowed(&true));
        assert_eq!(
            transition.check(&false),
            Err(MachineError::TransitionNotAllowed {
                transition: "go".to_string()
            })
        );
    }

    #[test]
    fn guard_is_checked_before_arguments() {
        let (a, b) = ids();
        let transition = Transition::new("go", a, b)
            .when(|_: &()| false)
            .with_argument(TransitionArgument::<i32>::new("int"));

        assert!(matches!(
            transition.check(&()),
            Err(MachineError::TransitionNotAllowed { .. })
        ));
    }

    #[test]
    fn unset_argument_blocks_until_filled() {
        let (a, b) = ids();
        let mut transition: Transition<()> =
            Transition::new("tr3", a, b).with_argument(TransitionArgument::<i32>::new("int"));

        assert_eq!(
            transition.check(&()),
            Err(MachineError::MissingArgument {
                transition: "tr3".to_string(),
                argument: "int".to_string(),
            })
        );

        transition.argument_mut::<i32>("int").unwrap().set_value(42);
        assert_eq!(transition.check(&()), Ok(()));
        assert_eq!(transition.argument::<i32>("int").unwrap().get_value(), Ok(&42));

        transition.clear_argument("int").unwrap();
        assert!(transition.check(&()).is_err());
    }

    #[test]
    fn missing_argument_reports_first_by_name() {
        let (a, b) = ids();
        let transition: Transition<()> = Transition::new("t", a, b)
            .with_argument(TransitionArgument::<u8>::new("zeta"))
            .with_argument(TransitionArgument::with_value("beta", 1u8))
            .with_argument(TransitionArgument::<u8>::new("alpha"));

        assert_eq!(transition.missing_argument(), Some("alpha"));
    }

    #[test]
    fn set_argument_replaces_by_name() {
        let (a, b) = ids();
        let mut transition: Transition<()> = Transition::new("t", a, b);
        transition.set_argument(TransitionArgument::<i32>::new("n"));
        transition.set_argument(TransitionArgument::with_value("n", "text".to_string()));

        assert_eq!(transition.arguments().count(), 1);
        assert!(transition.argument::<String>("n").is_ok());
        assert!(matches!(
            transition.argument::<i32>("n"),
            Err(MachineError::ArgumentTypeMismatch { .. })
        ));
    }

    #[test]
    fn removing_unknown_argument_fails() {
        let (a, b) = ids();
        let mut transition: Transition<()> =
            Transition::new("t", a, b).with_argument(TransitionArgument::<i32>::new("n"));

        assert!(transition.remove_argument("n").is_ok());
        assert!(!transition.has_argument("n"));
        assert_eq!(
            transition.remove_argument("n").err(),
            Some(MachineError::NoSuchArgument {
                transition: "t".to_string(),
                argument: "n".to_string(),
            })
        );
    }
}

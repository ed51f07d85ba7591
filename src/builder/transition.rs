//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{ErasedArgument, Guard, StateId, Transition, TransitionArgument};
use std::any::Any;

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<C> {
    name: Option<String>,
    from: Option<StateId>,
    to: Option<StateId>,
    guard: Option<Guard<C>>,
    arguments: Vec<Box<dyn ErasedArgument>>,
}

impl<C> TransitionBuilder<C> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            name: None,
            from: None,
            to: None,
            guard: None,
            arguments: Vec::new(),
        }
    }

    /// Set the transition name (required).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the source state (required).
    pub fn from(mut self, state: StateId) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: StateId) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard predicate (optional).
    pub fn guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Declare an argument of type `T` without a value.
    pub fn argument<T: Any + Send + Sync>(mut self, name: impl Into<String>) -> Self {
        self.arguments
            .push(Box::new(TransitionArgument::<T>::new(name)));
        self
    }

    /// Declare an argument and give it a value up front.
    pub fn argument_value<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.arguments
            .push(Box::new(TransitionArgument::with_value(name, value)));
        self
    }

    /// Build the transition. Later arguments replace earlier ones of the
    /// same name.
    pub fn build(self) -> Result<Transition<C>, BuildError> {
        let name = self.name.ok_or(BuildError::MissingName)?;
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        let mut transition = Transition::new(name, from, to);
        if let Some(guard) = self.guard {
            transition = transition.with_guard(guard);
        }
        for argument in self.arguments {
            transition.insert_argument(argument);
        }
        Ok(transition)
    }
}

impl<C> Default for TransitionBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

//! Typed value slots attached to transitions.

use super::artifact::Artifact;
use super::error::MachineError;
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any};
use std::fmt;

/// A named, typed value that must be supplied before a transition runs.
///
/// The slot starts empty unless created with [`TransitionArgument::with_value`].
/// It can be filled, read, cleared and filled again across attempts.
///
/// # Example
///
/// ```rust
/// use matryoshka::core::TransitionArgument;
///
/// let mut bet = TransitionArgument::<u32>::new("amount");
/// assert!(!bet.has_value());
/// assert!(bet.get_value().is_err());
///
/// bet.set_value(25);
/// assert_eq!(bet.get_value(), Ok(&25));
///
/// bet.unset_value();
/// assert!(!bet.has_value());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionArgument<T> {
    name: String,
    value: Option<T>,
}

impl<T> TransitionArgument<T> {
    /// Create an argument without a value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Create an argument that already holds a value.
    pub fn with_value(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }

    /// Name of the Rust type this argument holds.
    pub fn declared_type(&self) -> &'static str {
        type_name::<T>()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Read the value, failing with `NoValueSet` if the slot is empty.
    pub fn get_value(&self) -> Result<&T, MachineError> {
        self.value.as_ref().ok_or_else(|| MachineError::NoValueSet {
            argument: self.name.clone(),
        })
    }

    /// Set the value, replacing any previous one.
    pub fn set_value(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Empty the slot, returning the previous value if there was one.
    pub fn unset_value(&mut self) -> Option<T> {
        self.value.take()
    }
}

impl<T> Artifact for TransitionArgument<T> {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Serializable summary of an argument, as shown to facade users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub declared_type: String,
    pub has_value: bool,
}

/// Type-erased view of a [`TransitionArgument`], so one transition can hold
/// arguments of different types.
pub trait ErasedArgument: Artifact + Send + Sync {
    fn declared_type(&self) -> &'static str;

    fn has_value(&self) -> bool;

    /// Empty the slot, dropping any value.
    fn clear(&mut self);

    fn describe(&self) -> ArgumentDescriptor {
        ArgumentDescriptor {
            name: self.name().to_string(),
            declared_type: self.declared_type().to_string(),
            has_value: self.has_value(),
        }
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any + Send + Sync> ErasedArgument for TransitionArgument<T> {
    fn declared_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn has_value(&self) -> bool {
        self.value.is_some()
    }

    fn clear(&mut self) {
        self.value = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl fmt::Debug for dyn ErasedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name())
            .field("declared_type", &self.declared_type())
            .field("has_value", &self.has_value())
            .finish()
    }
}

pub(crate) fn downcast_ref<T: Any>(
    argument: &dyn ErasedArgument,
) -> Result<&TransitionArgument<T>, MachineError> {
    let declared = argument.declared_type();
    argument
        .as_any()
        .downcast_ref::<TransitionArgument<T>>()
        .ok_or_else(|| mismatch::<T>(argument.name(), declared))
}

pub(crate) fn downcast_mut<T: Any>(
    argument: &mut dyn ErasedArgument,
) -> Result<&mut TransitionArgument<T>, MachineError> {
    let declared = argument.declared_type();
    let name = argument.name().to_string();
    argument
        .as_any_mut()
        .downcast_mut::<TransitionArgument<T>>()
        .ok_or_else(|| mismatch::<T>(&name, declared))
}

fn mismatch<T>(argument: &str, declared: &'static str) -> MachineError {
    MachineError::ArgumentTypeMismatch {
        argument: argument.to_string(),
        declared,
        requested: type_name::<T>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_unset_value_fails() {
        let arg = TransitionArgument::<i32>::new("int");
        assert_eq!(
            arg.get_value(),
            Err(MachineError::NoValueSet {
                argument: "int".to_string()
            })
        );
    }

    #[test]
    fn set_replaces_unconditionally() {
        let mut arg = TransitionArgument::with_value("int", 1);
        arg.set_value(2);
        arg.set_value(42);
        assert_eq!(arg.get_value(), Ok(&42));
    }

    #[test]
    fn unset_is_reenterable() {
        let mut arg = TransitionArgument::with_value("name", "ann".to_string());
        assert_eq!(arg.unset_value(), Some("ann".to_string()));
        assert!(!arg.has_value());
        assert_eq!(arg.unset_value(), None);

        arg.set_value("bo".to_string());
        assert_eq!(arg.get_value().map(String::as_str), Ok("bo"));
    }

    #[test]
    fn declared_type_names_rust_type() {
        let arg = TransitionArgument::<i64>::new("n");
        assert_eq!(arg.declared_type(), "i64");
    }

    #[test]
    fn erased_argument_describes_itself() {
        let mut boxed: Box<dyn ErasedArgument> = Box::new(TransitionArgument::<u8>::new("b"));
        assert_eq!(
            boxed.describe(),
            ArgumentDescriptor {
                name: "b".to_string(),
                declared_type: "u8".to_string(),
                has_value: false,
            }
        );

        downcast_mut::<u8>(boxed.as_mut()).unwrap().set_value(3);
        assert!(boxed.has_value());

        boxed.clear();
        assert!(!boxed.has_value());
    }

    #[test]
    fn downcast_to_wrong_type_is_reported() {
        let boxed: Box<dyn ErasedArgument> = Box::new(TransitionArgument::<u8>::new("b"));
        let err = downcast_ref::<String>(boxed.as_ref()).unwrap_err();
        assert!(matches!(
            err,
            MachineError::ArgumentTypeMismatch { declared: "u8", .. }
        ));
    }
}

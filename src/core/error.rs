//! Errors raised while defining or driving state machines.

use thiserror::Error;

/// Errors that can occur while defining a topology or executing transitions.
///
/// Every variant is a recoverable condition reported to the immediate caller.
/// A failed transition never leaves a cursor half-updated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("State '{state}' has no transition named '{transition}'")]
    NoSuchTransition { state: String, transition: String },

    #[error("State '{state}' is not defined on machine '{machine}'")]
    NoSuchState { machine: String, state: String },

    #[error("State '{state}' is already defined (on machine '{machine}')")]
    StateAlreadyDefined { machine: String, state: String },

    #[error("Transition '{transition}' has no argument named '{argument}'")]
    NoSuchArgument {
        transition: String,
        argument: String,
    },

    #[error("No value has been set for argument '{argument}'")]
    NoValueSet { argument: String },

    #[error("Argument '{argument}' holds {declared}, not {requested}")]
    ArgumentTypeMismatch {
        argument: String,
        declared: &'static str,
        requested: &'static str,
    },

    #[error("Transition '{transition}' is currently disallowed")]
    TransitionNotAllowed { transition: String },

    #[error("Argument '{argument}' of transition '{transition}' has not been set")]
    MissingArgument {
        transition: String,
        argument: String,
    },

    #[error("Orphan state: '{state}' does not belong to any machine")]
    OrphanState { state: String },

    #[error("Invalid topology: {reason}")]
    InvalidTopology { reason: String },

    #[error("State '{state}' is not a state machine")]
    NotAMachine { state: String },

    #[error("Defining '{state}' on '{machine}' would nest a machine inside itself")]
    CyclicNesting { machine: String, state: String },

    #[error("State id does not belong to this graph")]
    ForeignState,
}

impl MachineError {
    /// True for both ways a transition can be refused at execution time:
    /// a false guard or an argument without a value.
    pub fn is_not_allowed(&self) -> bool {
        matches!(
            self,
            Self::TransitionNotAllowed { .. } | Self::MissingArgument { .. }
        )
    }
}

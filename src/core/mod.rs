//! Core building blocks of nested state machines.
//!
//! This module contains the pieces every topology is made of:
//! - Naming via the `Artifact` trait and `StateId` handles
//! - Typed transition arguments
//! - Guard predicates over an explicit context
//! - Transitions and states, including the machine capability
//! - The `MachineError` taxonomy

mod argument;
mod artifact;
mod error;
mod guard;
mod state;
mod transition;

pub use argument::{ArgumentDescriptor, ErasedArgument, TransitionArgument};
pub use artifact::{Artifact, StateId};
pub use error::MachineError;
pub use guard::Guard;
pub use state::{MachineCursor, StateHooks, StateKind, StateNode};
pub use transition::Transition;

pub(crate) use state::no_such_transition;

//! Encapsulated access to a root state machine.
//!
//! An [`OpaqueMachine`] hides states entirely. Callers list the transitions
//! allowed from the innermost active state, fill in their arguments and
//! execute them by name; the facade moves every cursor along the way.

mod history;
mod machine;
mod transition;

pub use history::{TransitionHistory, TransitionRecord};
pub use machine::OpaqueMachine;
pub use transition::OpaqueTransition;

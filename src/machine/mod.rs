//! The state graph: definition and execution of nested state machines.
//!
//! A [`StateGraph`] owns every state of a topology. Machines are states with
//! a cursor; defining a state on a machine records the membership on the
//! machine and a back-reference on the state.
//!
//! # Key Concepts
//!
//! - **Definition phase**: add states and machines, define sub-states, set
//!   transitions and their arguments
//! - **Execution phase**: check and execute transitions, move cursors
//! - **Deep current state**: the innermost active state, found by following
//!   cursors through nested machines

mod graph;
mod nesting;

pub use graph::StateGraph;

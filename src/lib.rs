//! Matryoshka: hierarchical finite state machines
//!
//! States can themselves be state machines, nested to any depth. All states
//! of a topology live in a [`StateGraph`] arena; machines point at their
//! current sub-state and sub-states point back at the machine they were
//! defined on.
//!
//! # Core Concepts
//!
//! - **Transitions**: named edges with an optional guard over a context and
//!   typed arguments that must be filled before execution
//! - **Hooks**: leave/enter behavior attached to states
//! - **Nesting**: machines define sub-states and track a current pointer
//! - **Opaque machine**: a facade that exposes only transition names and
//!   keeps every nested pointer consistent
//!
//! # Example
//!
//! ```rust
//! use matryoshka::{OpaqueMachine, StateGraph, Transition};
//!
//! let mut graph: StateGraph<u32> = StateGraph::new();
//! let game = graph.add_machine("game");
//! let lobby = graph.add_state("lobby");
//! let table = graph.add_state("table");
//! graph.define_state(game, lobby).unwrap();
//! graph.define_state(game, table).unwrap();
//!
//! graph.set_transition(Transition::new("open", game, lobby)).unwrap();
//! graph
//!     .set_transition(Transition::new("deal", lobby, table).when(|players: &u32| *players >= 2))
//!     .unwrap();
//!
//! let mut machine = OpaqueMachine::new(graph, game, 1).unwrap();
//! machine.execute("open").unwrap();
//! assert!(machine.transitions().is_empty());
//!
//! *machine.context_mut() += 1;
//! machine.execute("deal").unwrap();
//! assert!(machine.is_final());
//! ```

pub mod builder;
pub mod core;
pub mod machine;
pub mod opaque;

// Re-export commonly used types
pub use core::{
    Artifact, Guard, MachineError, StateHooks, StateId, Transition, TransitionArgument,
};
pub use machine::StateGraph;
pub use opaque::{OpaqueMachine, OpaqueTransition};

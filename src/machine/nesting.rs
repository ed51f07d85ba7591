//! Machine operations: sub-state registration and current-state cursors.

use super::graph::StateGraph;
use crate::core::{Artifact, MachineCursor, MachineError, StateId};
use std::collections::BTreeSet;
use tracing::{debug, trace};

impl<C> StateGraph<C> {
    fn cursor(&self, machine: StateId) -> Result<&MachineCursor, MachineError> {
        let node = self.state(machine)?;
        node.as_machine().ok_or_else(|| MachineError::NotAMachine {
            state: node.name().to_string(),
        })
    }

    fn cursor_mut(&mut self, machine: StateId) -> Result<&mut MachineCursor, MachineError> {
        self.state_mut(machine)?.machine_mut()
    }

    /// States registered on a machine (the machine itself is implicit).
    pub fn defined_states(&self, machine: StateId) -> Result<&BTreeSet<StateId>, MachineError> {
        Ok(self.cursor(machine)?.defined_states())
    }

    /// Whether `state` is the machine itself or one of its defined states.
    pub fn is_member(&self, machine: StateId, state: StateId) -> Result<bool, MachineError> {
        Ok(machine == state || self.cursor(machine)?.defined_states().contains(&state))
    }

    /// The machine a state was defined on.
    pub fn belongs_to(&self, state: StateId) -> Result<Option<StateId>, MachineError> {
        Ok(self.state(state)?.belongs_to())
    }

    /// Register `state` as a sub-state of `machine` and point its
    /// back-reference at the machine.
    ///
    /// A state can be defined on at most one machine at a time, and a machine
    /// can never end up nested inside itself.
    pub fn define_state(&mut self, machine: StateId, state: StateId) -> Result<(), MachineError> {
        let target = self.state(state)?;
        let owner = target.belongs_to();
        let cursor = self.cursor(machine)?;

        if machine == state || cursor.defined_states().contains(&state) {
            return Err(self.already_defined(machine, state));
        }
        if let Some(owner) = owner {
            return Err(self.already_defined(owner, state));
        }
        if target.is_machine() && self.is_nested_in(machine, state)? {
            return Err(MachineError::CyclicNesting {
                machine: self.name_of(machine),
                state: self.name_of(state),
            });
        }

        self.cursor_mut(machine)?.defined_mut().insert(state);
        self.state_mut(state)?.set_belongs_to(Some(machine));
        debug!(
            machine = %self.name_of(machine),
            state = %self.name_of(state),
            "State defined"
        );
        Ok(())
    }

    /// Remove `state` from `machine` and clear its back-reference.
    ///
    /// If the machine currently points at the removed state, it falls back to
    /// pointing at itself.
    pub fn undefine_state(&mut self, machine: StateId, state: StateId) -> Result<(), MachineError> {
        self.state(state)?;
        let cursor = self.cursor_mut(machine)?;
        if !cursor.defined_mut().remove(&state) {
            return Err(self.no_such_state(machine, state));
        }
        if cursor.current() == state {
            cursor.point_at(machine);
        }

        self.state_mut(state)?.set_belongs_to(None);
        debug!(
            machine = %self.name_of(machine),
            state = %self.name_of(state),
            "State undefined"
        );
        Ok(())
    }

    /// The state a machine currently points at.
    pub fn current(&self, machine: StateId) -> Result<StateId, MachineError> {
        Ok(self.cursor(machine)?.current())
    }

    /// Point a machine at one of its defined states, or at itself.
    pub fn set_current(&mut self, machine: StateId, state: StateId) -> Result<(), MachineError> {
        if !self.is_member(machine, state)? {
            return Err(self.no_such_state(machine, state));
        }
        trace!(machine = %machine, current = %state, "Cursor moved");
        self.cursor_mut(machine)?.point_at(state);
        Ok(())
    }

    /// Follow current pointers down through nested machines to the innermost
    /// active state.
    ///
    /// Stops at a state that is not a machine, or at a machine pointing at
    /// itself.
    pub fn current_deep(&self, machine: StateId) -> Result<StateId, MachineError> {
        let mut at = machine;
        let mut next = self.cursor(machine)?.current();
        while next != at {
            at = next;
            match self.state(at)?.as_machine() {
                Some(cursor) => next = cursor.current(),
                None => break,
            }
        }
        Ok(at)
    }

    /// Whether `machine` is `ancestor` or sits somewhere below it.
    fn is_nested_in(&self, machine: StateId, ancestor: StateId) -> Result<bool, MachineError> {
        let mut at = Some(machine);
        while let Some(id) = at {
            if id == ancestor {
                return Ok(true);
            }
            at = self.state(id)?.belongs_to();
        }
        Ok(false)
    }

    fn already_defined(&self, machine: StateId, state: StateId) -> MachineError {
        MachineError::StateAlreadyDefined {
            machine: self.name_of(machine),
            state: self.name_of(state),
        }
    }

    fn no_such_state(&self, machine: StateId, state: StateId) -> MachineError {
        MachineError::NoSuchState {
            machine: self.name_of(machine),
            state: self.name_of(state),
        }
    }
}

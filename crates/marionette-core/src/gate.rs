//! Gated access to interpreter-visible game state
//!
//! Switches and variables are shared with the rest of the host game. While
//! a puppet battle runs they are locked; the playback driver grants the
//! effect interpreter access for exactly one step at a time, and the grant
//! cannot outlive the step because it is a borrow.

use indexmap::IndexMap;
use std::ops::{Deref, DerefMut};

/// Cross-cutting state secondary effects are allowed to touch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SharedState {
    /// Boolean switches by id
    pub switches: IndexMap<u32, bool>,
    /// Integer variables by id
    pub variables: IndexMap<u32, i32>,
}

impl SharedState {
    /// Create empty shared state
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a switch; unset switches are off
    pub fn switch(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }

    /// Set a switch
    pub fn set_switch(&mut self, id: u32, value: bool) {
        self.switches.insert(id, value);
    }

    /// Read a variable; unset variables are zero
    pub fn variable(&self, id: u32) -> i32 {
        self.variables.get(&id).copied().unwrap_or(0)
    }

    /// Set a variable
    pub fn set_variable(&mut self, id: u32, value: i32) {
        self.variables.insert(id, value);
    }
}

/// Lockable cell around [`SharedState`]
///
/// The host owns one of these. Outside battle, `write` hands out mutable
/// access freely. During a puppet battle the controller locks the cell and
/// only [`GateCell::grant`] (called by the driver around an interpreter
/// step) opens it, through a guard that restores the lock on drop.
#[derive(Debug, Default)]
pub struct GateCell {
    state: SharedState,
    locked: bool,
    granted: bool,
}

impl GateCell {
    /// Wrap shared state in an unlocked cell
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            locked: false,
            granted: false,
        }
    }

    /// Read access is never gated
    pub fn read(&self) -> &SharedState {
        &self.state
    }

    /// Lock the cell for the duration of a battle
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Release the battle lock
    pub fn release(&mut self) {
        self.locked = false;
    }

    /// True while the battle lock is held
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True only inside a granted interpreter step
    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Mutable access for host code; refused while locked
    pub fn write(&mut self) -> Option<&mut SharedState> {
        if self.locked {
            None
        } else {
            Some(&mut self.state)
        }
    }

    /// Scoped mutation grant for one interpreter step
    pub fn grant(&mut self) -> GateGuard<'_> {
        self.granted = true;
        GateGuard { cell: self }
    }
}

/// Borrow-scoped mutation permission; closes the gate on drop
pub struct GateGuard<'a> {
    cell: &'a mut GateCell,
}

impl Deref for GateGuard<'_> {
    type Target = SharedState;

    fn deref(&self) -> &SharedState {
        &self.cell.state
    }
}

impl DerefMut for GateGuard<'_> {
    fn deref_mut(&mut self) -> &mut SharedState {
        &mut self.cell.state
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.cell.granted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_defaults() {
        let state = SharedState::new();
        assert!(!state.switch(3));
        assert_eq!(state.variable(9), 0);
    }

    #[test]
    fn test_lock_refuses_host_writes() {
        let mut cell = GateCell::new(SharedState::new());
        assert!(cell.write().is_some());
        cell.lock();
        assert!(cell.write().is_none());
        cell.release();
        assert!(cell.write().is_some());
    }

    #[test]
    fn test_grant_closes_on_drop() {
        let mut cell = GateCell::new(SharedState::new());
        cell.lock();
        {
            let mut guard = cell.grant();
            guard.set_switch(1, true);
            assert!(guard.switch(1));
        }
        assert!(!cell.is_granted());
        assert!(cell.is_locked());
        assert!(cell.read().switch(1));
    }
}

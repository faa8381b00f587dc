//! Battle session state
//!
//! Lives from battle_start to battle_end. Holds the server's roster
//! snapshot; every lookup goes through a [`BattlerRef`] at the moment of
//! use so stale references degrade to a `None`, never to a wrong battler.

use crate::battler::{BattlerRef, Combatant, PartyMember, Side, TroopMember, Vitals};
use crate::id::StateId;
use serde::{Deserialize, Serialize};

/// Roster snapshot for one server-driven battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSession {
    /// Player side, in server actor order
    pub party: Vec<PartyMember>,
    /// Enemy side, in server troop order
    pub troop: Vec<TroopMember>,
}

impl BattleSession {
    /// Create a session from materialized rosters
    pub fn new(party: Vec<PartyMember>, troop: Vec<TroopMember>) -> Self {
        Self { party, troop }
    }

    /// Resolve a reference to its read-only capabilities
    pub fn combatant(&self, r: BattlerRef) -> Option<&dyn Combatant> {
        match r.side {
            Side::Party => self.party.get(r.index).map(|m| m as &dyn Combatant),
            Side::Troop => self.troop.get(r.index).map(|m| m as &dyn Combatant),
        }
    }

    /// Resolve a reference to its resource pools
    pub fn vitals(&self, r: BattlerRef) -> Option<&Vitals> {
        match r.side {
            Side::Party => self.party.get(r.index).map(|m| &m.vitals),
            Side::Troop => self.troop.get(r.index).map(|m| &m.vitals),
        }
    }

    /// Resolve a reference to its resource pools, mutably
    pub fn vitals_mut(&mut self, r: BattlerRef) -> Option<&mut Vitals> {
        match r.side {
            Side::Party => self.party.get_mut(r.index).map(|m| &mut m.vitals),
            Side::Troop => self.troop.get_mut(r.index).map(|m| &mut m.vitals),
        }
    }

    /// Get a troop member by index
    pub fn troop_member(&self, index: usize) -> Option<&TroopMember> {
        self.troop.get(index)
    }

    /// Get a troop member by index, mutably
    pub fn troop_member_mut(&mut self, index: usize) -> Option<&mut TroopMember> {
        self.troop.get_mut(index)
    }

    /// Get a party member by index
    pub fn party_member(&self, index: usize) -> Option<&PartyMember> {
        self.party.get(index)
    }

    /// Add a status state; false when the reference is stale
    pub fn add_state(&mut self, r: BattlerRef, state: StateId) -> bool {
        match r.side {
            Side::Party => match self.party.get_mut(r.index) {
                Some(m) => {
                    m.add_state(state);
                    true
                }
                None => false,
            },
            Side::Troop => match self.troop.get_mut(r.index) {
                Some(m) => {
                    m.add_state(state);
                    true
                }
                None => false,
            },
        }
    }

    /// Remove a status state; false when the reference is stale
    pub fn remove_state(&mut self, r: BattlerRef, state: StateId) -> bool {
        match r.side {
            Side::Party => match self.party.get_mut(r.index) {
                Some(m) => {
                    m.remove_state(state);
                    true
                }
                None => false,
            },
            Side::Troop => match self.troop.get_mut(r.index) {
                Some(m) => {
                    m.remove_state(state);
                    true
                }
                None => false,
            },
        }
    }

    /// Record a collapse; troop members stop rendering
    pub fn mark_collapsed(&mut self, r: BattlerRef) {
        if r.side == Side::Troop {
            if let Some(m) = self.troop.get_mut(r.index) {
                m.hidden = true;
            }
        }
    }

    /// Party members still standing, for reward distribution
    pub fn living_party(&self) -> impl Iterator<Item = &PartyMember> {
        self.party.iter().filter(|m| m.vitals.alive())
    }

    /// True once every enemy is down or hidden
    pub fn troop_defeated(&self) -> bool {
        self.troop.iter().all(|m| m.hidden || !m.vitals.alive())
    }
}

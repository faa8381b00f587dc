//! Battler identity and roster member types
//!
//! Combatants are addressed by side + index because that is how the server
//! speaks about them. References are resolved against the current roster at
//! the moment of use; nothing holds onto a resolved member across ticks.

use crate::id::{AnimationId, EnemyId, StateId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard cap on technical points, shared by every battler
pub const TP_MAX: i32 = 100;

/// Which side of the battlefield a combatant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Player-controlled party
    Party,
    /// Server-spawned enemy troop
    Troop,
}

/// Reference to a combatant by side and roster index
///
/// On the wire this is `{ is_actor, index }`; in memory the side is an
/// enum so match arms stay honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WireRef", into = "WireRef")]
pub struct BattlerRef {
    /// Side the index is relative to
    pub side: Side,
    /// Position within that side's roster
    pub index: usize,
}

impl BattlerRef {
    /// Reference a party member by index
    pub fn party(index: usize) -> Self {
        Self {
            side: Side::Party,
            index,
        }
    }

    /// Reference a troop member by index
    pub fn troop(index: usize) -> Self {
        Self {
            side: Side::Troop,
            index,
        }
    }

    /// True when this reference points at the player party
    pub fn is_party(&self) -> bool {
        self.side == Side::Party
    }
}

impl fmt::Display for BattlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Party => write!(f, "party[{}]", self.index),
            Side::Troop => write!(f, "troop[{}]", self.index),
        }
    }
}

/// Wire layout of a battler reference
#[derive(Serialize, Deserialize, Clone, Copy)]
struct WireRef {
    is_actor: bool,
    index: usize,
}

impl From<WireRef> for BattlerRef {
    fn from(w: WireRef) -> Self {
        Self {
            side: if w.is_actor { Side::Party } else { Side::Troop },
            index: w.index,
        }
    }
}

impl From<BattlerRef> for WireRef {
    fn from(r: BattlerRef) -> Self {
        Self {
            is_actor: r.side == Side::Party,
            index: r.index,
        }
    }
}

/// Current and maximum resource pools for one combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub tp: i32,
}

impl Vitals {
    /// Create vitals at full health
    pub fn full(max_hp: i32, max_mp: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            tp: 0,
        }
    }

    /// Overwrite hp with an absolute value, clamped to `[0, max_hp]`
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
    }

    /// Overwrite mp with an absolute value, clamped to `[0, max_mp]`
    pub fn set_mp(&mut self, mp: i32) {
        self.mp = mp.clamp(0, self.max_mp);
    }

    /// Apply regeneration deltas, clamping each pool
    pub fn regen(&mut self, hp: i32, mp: i32, tp: i32) {
        self.set_hp(self.hp + hp);
        self.set_mp(self.mp + mp);
        self.tp = (self.tp + tp).clamp(0, TP_MAX);
    }

    /// True while hp is above zero
    pub fn alive(&self) -> bool {
        self.hp > 0
    }
}

/// Server-sent stat overrides for one identity
///
/// Installed at battle start so host-side stat lookups agree with the
/// server's numbers, cleared without exception at battle end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatOverride {
    #[serde(default)]
    pub max_hp: Option<i32>,
    #[serde(default)]
    pub max_mp: Option<i32>,
    #[serde(default)]
    pub attack: Option<i32>,
    #[serde(default)]
    pub defense: Option<i32>,
}

impl StatOverride {
    /// True when no field is overridden
    pub fn is_empty(&self) -> bool {
        self.max_hp.is_none()
            && self.max_mp.is_none()
            && self.attack.is_none()
            && self.defense.is_none()
    }
}

/// Read-only capabilities playback code needs from any combatant
///
/// Both member kinds implement this so the animator and the effect
/// interpreter never branch on concrete types.
pub trait Combatant {
    /// True for troop members
    fn is_enemy(&self) -> bool;

    /// Display name
    fn name(&self) -> &str;

    /// Animation played for this battler's basic attack
    fn attack_animation(&self) -> AnimationId;

    /// Current hit points
    fn hp(&self) -> i32;

    /// Maximum hit points
    fn max_hp(&self) -> i32;

    /// True while the battler can still act
    fn alive(&self) -> bool {
        self.hp() > 0
    }
}

/// One player-side roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyMember {
    /// Position in the party, matching server actor indices
    pub index: usize,
    pub name: String,
    pub vitals: Vitals,
    /// Active status states in application order
    pub states: Vec<StateId>,
    /// Animation for this actor's plain attack
    pub attack_animation: AnimationId,
}

impl PartyMember {
    /// Create a party member with the given vitals
    pub fn new(index: usize, name: impl Into<String>, vitals: Vitals) -> Self {
        Self {
            index,
            name: name.into(),
            vitals,
            states: Vec::new(),
            attack_animation: AnimationId::new(1),
        }
    }

    /// Set the basic-attack animation
    pub fn with_attack_animation(mut self, animation: AnimationId) -> Self {
        self.attack_animation = animation;
        self
    }

    /// Add a status state unless already present
    pub fn add_state(&mut self, state: StateId) {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
    }

    /// Remove a status state if present
    pub fn remove_state(&mut self, state: StateId) {
        self.states.retain(|s| *s != state);
    }
}

impl Combatant for PartyMember {
    fn is_enemy(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attack_animation(&self) -> AnimationId {
        self.attack_animation
    }

    fn hp(&self) -> i32 {
        self.vitals.hp
    }

    fn max_hp(&self) -> i32 {
        self.vitals.max_hp
    }
}

/// One enemy-side roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TroopMember {
    /// Position in the troop, matching server enemy indices
    pub index: usize,
    /// Template this enemy was spawned from
    pub enemy: EnemyId,
    pub name: String,
    pub vitals: Vitals,
    pub states: Vec<StateId>,
    /// Animation for this enemy's plain attack
    pub attack_animation: AnimationId,
    /// Screen slot assigned at battle start
    pub slot: (i32, i32),
    /// Collapsed enemies stay in the roster but stop rendering
    pub hidden: bool,
}

impl TroopMember {
    /// Create a troop member from template data
    pub fn new(index: usize, enemy: EnemyId, name: impl Into<String>, vitals: Vitals) -> Self {
        Self {
            index,
            enemy,
            name: name.into(),
            vitals,
            states: Vec::new(),
            attack_animation: AnimationId::new(1),
            slot: (0, 0),
            hidden: false,
        }
    }

    /// Set the basic-attack animation
    pub fn with_attack_animation(mut self, animation: AnimationId) -> Self {
        self.attack_animation = animation;
        self
    }

    /// Set the screen slot
    pub fn with_slot(mut self, slot: (i32, i32)) -> Self {
        self.slot = slot;
        self
    }

    /// Swap this enemy onto a different template
    ///
    /// Only identity and presentation change; vitals stay server-owned and
    /// are corrected by the next action result.
    pub fn retemplate(
        &mut self,
        enemy: EnemyId,
        name: impl Into<String>,
        attack_animation: AnimationId,
    ) {
        self.enemy = enemy;
        self.name = name.into();
        self.attack_animation = attack_animation;
    }

    /// Add a status state unless already present
    pub fn add_state(&mut self, state: StateId) {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
    }

    /// Remove a status state if present
    pub fn remove_state(&mut self, state: StateId) {
        self.states.retain(|s| *s != state);
    }
}

impl Combatant for TroopMember {
    fn is_enemy(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attack_animation(&self) -> AnimationId {
        self.attack_animation
    }

    fn hp(&self) -> i32 {
        self.vitals.hp
    }

    fn max_hp(&self) -> i32 {
        self.vitals.max_hp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ref_roundtrip() {
        let r = BattlerRef::troop(2);
        let ron = ron::to_string(&r).unwrap();
        assert!(ron.contains("is_actor:false") || ron.contains("is_actor: false"));
        let back: BattlerRef = ron::from_str(&ron).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_vitals_clamping() {
        let mut v = Vitals::full(50, 10);
        v.set_hp(80);
        assert_eq!(v.hp, 50);
        v.set_hp(-5);
        assert_eq!(v.hp, 0);
        assert!(!v.alive());
    }

    #[test]
    fn test_regen_clamps_tp() {
        let mut v = Vitals::full(50, 10);
        v.tp = 95;
        v.regen(0, 0, 20);
        assert_eq!(v.tp, TP_MAX);
    }

    #[test]
    fn test_states_dedup() {
        let mut m = PartyMember::new(0, "Alia", Vitals::full(100, 20));
        m.add_state(StateId::new(4));
        m.add_state(StateId::new(4));
        assert_eq!(m.states.len(), 1);
        m.remove_state(StateId::new(4));
        assert!(m.states.is_empty());
    }

    #[test]
    fn test_combatant_capabilities() {
        let e = TroopMember::new(0, EnemyId::new(3), "Slime", Vitals::full(30, 0))
            .with_attack_animation(AnimationId::new(6));
        assert!(e.is_enemy());
        assert_eq!(e.attack_animation(), AnimationId::new(6));
        assert!(e.alive());
    }

    #[test]
    fn test_stat_override_empty() {
        assert!(StatOverride::default().is_empty());
        let o = StatOverride {
            max_hp: Some(80),
            ..Default::default()
        };
        assert!(!o.is_empty());
    }
}

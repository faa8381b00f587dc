//! Combat events replayed by the playback driver
//!
//! Everything in here is data the server already resolved. The client never
//! recomputes outcomes; it applies the absolute after-values in order.

use crate::battler::BattlerRef;
use crate::error::Error;
use crate::id::{EffectId, ItemId, SkillId, StateId};
use serde::{Deserialize, Serialize};

/// One unit of playback work, consumed from the queue exactly once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A battler acted; animate then apply the per-target outcomes
    Action(ActionEvent),
    /// The round ended; apply regeneration with no animation
    TurnEnd(TurnEndEvent),
}

/// A resolved action with its per-target outcomes in server order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Who acted
    pub subject: BattlerRef,
    /// Skill used, if any
    #[serde(default)]
    pub skill: Option<SkillId>,
    /// Item used, if any
    #[serde(default)]
    pub item: Option<ItemId>,
    /// Outcomes, one per affected target, in application order
    pub targets: Vec<TargetOutcome>,
}

/// What the action did to one target
///
/// `hp_after` and `mp_after` are absolute: applying an outcome twice leaves
/// the target in the same state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target: BattlerRef,
    #[serde(default)]
    pub missed: bool,
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub critical: bool,
    pub hp_after: i32,
    pub mp_after: i32,
    #[serde(default)]
    pub added_states: Vec<StateId>,
    #[serde(default)]
    pub removed_states: Vec<StateId>,
    /// Secondary-effect blocks to run after results apply, in order
    #[serde(default)]
    pub effects: Vec<EffectId>,
}

impl TargetOutcome {
    /// An outcome that only rewrites pools, for the common case
    pub fn hit(target: BattlerRef, damage: i32, hp_after: i32, mp_after: i32) -> Self {
        Self {
            target,
            missed: false,
            damage,
            critical: false,
            hp_after,
            mp_after,
            added_states: Vec::new(),
            removed_states: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// A whiffed outcome; pools stay untouched
    pub fn miss(target: BattlerRef, hp_after: i32, mp_after: i32) -> Self {
        Self {
            target,
            missed: true,
            damage: 0,
            critical: false,
            hp_after,
            mp_after,
            added_states: Vec::new(),
            removed_states: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Mark the outcome critical
    pub fn with_critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Attach secondary-effect blocks
    pub fn with_effects(mut self, effects: Vec<EffectId>) -> Self {
        self.effects = effects;
        self
    }
}

/// End-of-round bookkeeping from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEndEvent {
    /// Per-battler regeneration deltas
    #[serde(default)]
    pub regens: Vec<RegenOutcome>,
}

/// Regeneration deltas for one battler, applied atomically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenOutcome {
    pub battler: BattlerRef,
    #[serde(default)]
    pub hp: i32,
    #[serde(default)]
    pub mp: i32,
    #[serde(default)]
    pub tp: i32,
}

/// How the server says the battle ended
///
/// Wire codes: 0 victory, 1 escape, 2 defeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BattleResult {
    Victory,
    Escape,
    Defeat,
}

impl From<BattleResult> for u8 {
    fn from(r: BattleResult) -> Self {
        match r {
            BattleResult::Victory => 0,
            BattleResult::Escape => 1,
            BattleResult::Defeat => 2,
        }
    }
}

impl TryFrom<u8> for BattleResult {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(BattleResult::Victory),
            1 => Ok(BattleResult::Escape),
            2 => Ok(BattleResult::Defeat),
            other => Err(Error::InvalidField(format!("battle result {}", other))),
        }
    }
}

/// Inventory category of a dropped reward
///
/// Wire codes: 1 item, 2 weapon, 3 armor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ItemKind {
    Item,
    Weapon,
    Armor,
}

impl From<ItemKind> for u8 {
    fn from(k: ItemKind) -> Self {
        match k {
            ItemKind::Item => 1,
            ItemKind::Weapon => 2,
            ItemKind::Armor => 3,
        }
    }
}

impl TryFrom<u8> for ItemKind {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            1 => Ok(ItemKind::Item),
            2 => Ok(ItemKind::Weapon),
            3 => Ok(ItemKind::Armor),
            other => Err(Error::InvalidField(format!("item kind {}", other))),
        }
    }
}

/// One dropped reward line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropAward {
    #[serde(rename = "item_type")]
    pub kind: ItemKind,
    #[serde(rename = "item_id")]
    pub id: u32,
    pub quantity: u32,
}

/// Everything the server awards at battle end
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBundle {
    #[serde(default)]
    pub exp: i32,
    #[serde(default)]
    pub gold: i32,
    #[serde(default)]
    pub drops: Vec<DropAward>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battle_result_codes() {
        assert_eq!(u8::from(BattleResult::Victory), 0);
        assert_eq!(BattleResult::try_from(2).unwrap(), BattleResult::Defeat);
        assert!(BattleResult::try_from(9).is_err());
    }

    #[test]
    fn test_item_kind_codes() {
        assert_eq!(u8::from(ItemKind::Weapon), 2);
        assert_eq!(ItemKind::try_from(1).unwrap(), ItemKind::Item);
        assert!(ItemKind::try_from(0).is_err());
    }

    #[test]
    fn test_drop_award_wire_names() {
        let d = DropAward {
            kind: ItemKind::Item,
            id: 7,
            quantity: 2,
        };
        let ron = ron::to_string(&d).unwrap();
        assert!(ron.contains("item_type"));
        assert!(ron.contains("item_id"));
    }

    #[test]
    fn test_outcome_builders() {
        let o = TargetOutcome::hit(BattlerRef::troop(0), 15, 65, 10).with_critical();
        assert!(o.critical);
        assert_eq!(o.hp_after, 65);
        let m = TargetOutcome::miss(BattlerRef::party(1), 100, 20);
        assert!(m.missed);
        assert_eq!(m.damage, 0);
    }
}

//! Wire protocol between the battle server and this client
//!
//! Variant names match the server's message names; the link layer frames
//! these with bincode, so enums stay externally tagged. Every battler
//! reference crosses the wire as `{ is_actor, index }` and is re-resolved
//! against the roster when the message is consumed.

use crate::battler::{BattlerRef, StatOverride};
use crate::error::Error;
use crate::event::{BattleResult, DropAward, RegenOutcome, TargetOutcome};
use crate::id::{AnimationId, EnemyId, ItemId, SkillId};
use serde::{Deserialize, Serialize};

// ---------- server → client ----------

/// Messages the server pushes at the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMessage {
    /// Open a puppet session with the full roster
    BattleStart {
        actors: Vec<ActorSetup>,
        enemies: Vec<EnemySetup>,
    },
    /// Ask one actor for a command
    BattleInputRequest { actor_index: usize },
    /// A new round began; informational only
    BattleTurnStart {},
    /// One resolved action to play back
    BattleActionResult {
        subject: BattlerRef,
        #[serde(default)]
        skill_id: Option<SkillId>,
        #[serde(default)]
        item_id: Option<ItemId>,
        targets: Vec<TargetOutcome>,
    },
    /// End-of-round regeneration
    BattleTurnEnd {
        #[serde(default)]
        regens: Vec<RegenOutcome>,
    },
    /// The battle is over; rewards and terminal processing
    BattleEnd {
        result: BattleResult,
        #[serde(default)]
        exp: i32,
        #[serde(default)]
        gold: i32,
        #[serde(default)]
        drops: Vec<DropAward>,
    },
}

/// Server-sent snapshot of one party member at battle start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSetup {
    pub index: usize,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    #[serde(default)]
    pub tp: i32,
    /// Basic-attack animation for this actor
    #[serde(default = "default_attack_animation")]
    pub attack_animation: AnimationId,
    /// Stat overrides the host's lookups must agree with
    #[serde(default)]
    pub overrides: StatOverride,
}

/// Server-sent snapshot of one troop member at battle start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySetup {
    pub enemy_id: EnemyId,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub mp: i32,
    #[serde(default)]
    pub max_mp: i32,
}

fn default_attack_animation() -> AnimationId {
    AnimationId::new(1)
}

// ---------- client → server ----------

/// Messages the client sends back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMessage {
    /// The player's chosen command for the requested actor
    BattleInput {
        actor_index: usize,
        action_type: ActionType,
        #[serde(default)]
        skill_id: Option<SkillId>,
        #[serde(default)]
        item_id: Option<ItemId>,
        #[serde(default)]
        target_indices: Vec<usize>,
        #[serde(default)]
        target_is_actor: bool,
    },
    /// Confirms the client finished terminal processing
    BattleResultAck { result: BattleResult },
}

/// Command category of an input message
///
/// Wire codes: 0 attack, 1 skill, 2 item, 3 guard, 4 flee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ActionType {
    Attack,
    Skill,
    Item,
    Guard,
    Flee,
}

impl From<ActionType> for u8 {
    fn from(a: ActionType) -> Self {
        match a {
            ActionType::Attack => 0,
            ActionType::Skill => 1,
            ActionType::Item => 2,
            ActionType::Guard => 3,
            ActionType::Flee => 4,
        }
    }
}

impl TryFrom<u8> for ActionType {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(ActionType::Attack),
            1 => Ok(ActionType::Skill),
            2 => Ok(ActionType::Item),
            3 => Ok(ActionType::Guard),
            4 => Ok(ActionType::Flee),
            other => Err(Error::InvalidField(format!("action type {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_codes() {
        assert_eq!(u8::from(ActionType::Guard), 3);
        assert_eq!(u8::from(ActionType::Flee), 4);
        assert_eq!(ActionType::try_from(0).unwrap(), ActionType::Attack);
        assert!(ActionType::try_from(7).is_err());
    }

    #[test]
    fn test_snake_case_variant_names() {
        let msg = ServerMessage::BattleTurnStart {};
        let ron = ron::to_string(&msg).unwrap();
        assert!(ron.contains("battle_turn_start"));
    }

    #[test]
    fn test_actor_setup_defaults() {
        let ron = r#"(index: 0, name: "Alia", hp: 100, max_hp: 100, mp: 20, max_mp: 20)"#;
        let setup: ActorSetup = ron::from_str(ron).unwrap();
        assert_eq!(setup.tp, 0);
        assert_eq!(setup.attack_animation, AnimationId::new(1));
        assert!(setup.overrides.is_empty());
    }
}

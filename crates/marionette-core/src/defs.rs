//! Content definitions the client needs for presentation and input
//!
//! These mirror the server's database just far enough to animate actions
//! and drive target pickers: animation ids, target scopes, display names.
//! Numbers that matter (damage, costs applied to pools) stay server-side.

use crate::id::{AnimationId, EffectId, EnemyId, ItemId, SkillId, StateId};
use crate::interpreter::ScriptCommand;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Who a skill or item wants aimed at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetScope {
    /// No target at all; the server works it out
    None,
    /// The user itself
    User,
    /// One party member
    Ally,
    /// One troop member
    Enemy,
}

impl Default for TargetScope {
    fn default() -> Self {
        TargetScope::Enemy
    }
}

/// One skill the server may reference in actions or input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub animation: AnimationId,
    #[serde(default)]
    pub scope: TargetScope,
    /// Shown in menus; the server still deducts the real cost
    #[serde(default)]
    pub mp_cost: i32,
}

/// One usable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub animation: AnimationId,
    #[serde(default = "default_item_scope")]
    pub scope: TargetScope,
}

fn default_item_scope() -> TargetScope {
    TargetScope::Ally
}

/// One enemy template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub id: EnemyId,
    pub name: String,
    /// Played when an action result redirects to the basic attack
    #[serde(default = "default_enemy_attack")]
    pub attack_animation: AnimationId,
}

fn default_enemy_attack() -> AnimationId {
    AnimationId::new(1)
}

/// One status state, for display only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    pub id: StateId,
    pub name: String,
}

/// One secondary-effect command block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDef {
    pub id: EffectId,
    #[serde(default)]
    pub name: String,
    pub commands: Vec<ScriptCommand>,
}

/// Registry of every definition the client knows about
#[derive(Debug, Default, Clone)]
pub struct ContentDefs {
    /// Skill definitions by ID
    pub skills: IndexMap<SkillId, SkillDef>,
    /// Item definitions by ID
    pub items: IndexMap<ItemId, ItemDef>,
    /// Enemy templates by ID
    pub enemies: IndexMap<EnemyId, EnemyDef>,
    /// State definitions by ID
    pub states: IndexMap<StateId, StateDef>,
    /// Secondary-effect blocks by ID
    pub effects: IndexMap<EffectId, EffectDef>,
}

impl ContentDefs {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a skill definition
    pub fn skill(&self, id: SkillId) -> Option<&SkillDef> {
        self.skills.get(&id)
    }

    /// Get an item definition
    pub fn item(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(&id)
    }

    /// Get an enemy template
    pub fn enemy(&self, id: EnemyId) -> Option<&EnemyDef> {
        self.enemies.get(&id)
    }

    /// Get a state definition
    pub fn state(&self, id: StateId) -> Option<&StateDef> {
        self.states.get(&id)
    }

    /// Get a secondary-effect block
    pub fn effect(&self, id: EffectId) -> Option<&EffectDef> {
        self.effects.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_defaults() {
        let def: SkillDef = ron::from_str(r#"(id: 8, name: "Fire")"#).unwrap();
        assert_eq!(def.scope, TargetScope::Enemy);
        assert_eq!(def.animation, AnimationId::new(0));
        assert_eq!(def.mp_cost, 0);
    }

    #[test]
    fn test_item_default_scope_is_ally() {
        let def: ItemDef = ron::from_str(r#"(id: 7, name: "Potion")"#).unwrap();
        assert_eq!(def.scope, TargetScope::Ally);
    }

    #[test]
    fn test_registry_lookup() {
        let mut defs = ContentDefs::new();
        defs.enemies.insert(
            EnemyId::new(3),
            EnemyDef {
                id: EnemyId::new(3),
                name: "Slime".into(),
                attack_animation: AnimationId::new(6),
            },
        );
        assert!(defs.enemy(EnemyId::new(3)).is_some());
        assert!(defs.enemy(EnemyId::new(4)).is_none());
    }
}

//! Scripted stand-in for the battle server
//!
//! Resolves one fight against a single slime, doing the combat math the
//! real server would do and pushing the same message sequence: start,
//! input request, action results, turn end, battle end. Lives on the far
//! end of the in-memory transport so the client exercises the whole wire
//! path.

use marionette_core::{
    ActionType, ActorSetup, AnimationId, BattleResult, BattlerRef, ClientMessage, DropAward,
    EffectId, EnemySetup, EnemyId, ItemId, ItemKind, RegenOutcome, ServerMessage, SkillId,
    StatOverride, TargetOutcome,
};
use marionette_net::{InMemoryTransport, Link, Result};

const ENEMY_MAX_HP: i32 = 60;
const ACTOR_MAX_HP: i32 = 80;
const ACTOR_MAX_MP: i32 = 20;
const ATTACK_DAMAGE: i32 = 12;
const FIRE_DAMAGE: i32 = 20;
const FIRE_MP_COST: i32 = 4;
const POTION_HEAL: i32 = 25;
const ENEMY_DAMAGE: i32 = 8;
const REGEN_HP: i32 = 2;

pub struct StubServer {
    link: Link<InMemoryTransport, ClientMessage, ServerMessage>,
    enemy_hp: i32,
    actor_hp: i32,
    actor_mp: i32,
    guarding: bool,
    enraged: bool,
    pub finished: bool,
}

impl StubServer {
    /// Start the fight: opening volley goes out immediately
    pub fn new(transport: InMemoryTransport) -> Result<Self> {
        let mut server = Self {
            link: Link::new(transport),
            enemy_hp: ENEMY_MAX_HP,
            actor_hp: 50,
            actor_mp: ACTOR_MAX_MP,
            guarding: false,
            enraged: false,
            finished: false,
        };
        server.link.send(&ServerMessage::BattleStart {
            actors: vec![ActorSetup {
                index: 0,
                name: "Alia".into(),
                hp: server.actor_hp,
                max_hp: ACTOR_MAX_HP,
                mp: server.actor_mp,
                max_mp: ACTOR_MAX_MP,
                tp: 0,
                attack_animation: AnimationId::new(1),
                overrides: StatOverride {
                    max_hp: Some(ACTOR_MAX_HP),
                    ..Default::default()
                },
            }],
            enemies: vec![EnemySetup {
                enemy_id: EnemyId::new(3),
                hp: server.enemy_hp,
                max_hp: ENEMY_MAX_HP,
                mp: 0,
                max_mp: 0,
            }],
        })?;
        server.link.send(&ServerMessage::BattleTurnStart {})?;
        server
            .link
            .send(&ServerMessage::BattleInputRequest { actor_index: 0 })?;
        Ok(server)
    }

    /// Process everything the client sent since last tick
    pub fn pump(&mut self) -> Result<()> {
        while let Some(message) = self.link.poll()? {
            match message {
                ClientMessage::BattleInput {
                    action_type,
                    skill_id,
                    item_id,
                    ..
                } => self.resolve_round(action_type, skill_id, item_id)?,
                ClientMessage::BattleResultAck { .. } => {
                    self.finished = true;
                }
            }
        }
        Ok(())
    }

    /// Resolve one full round from the player's choice
    fn resolve_round(
        &mut self,
        action_type: ActionType,
        skill_id: Option<SkillId>,
        item_id: Option<ItemId>,
    ) -> Result<()> {
        self.guarding = false;
        match action_type {
            ActionType::Flee => {
                return self.link.send(&ServerMessage::BattleEnd {
                    result: BattleResult::Escape,
                    exp: 0,
                    gold: 0,
                    drops: Vec::new(),
                });
            }
            ActionType::Guard => {
                self.guarding = true;
            }
            ActionType::Attack => {
                self.hit_enemy(ATTACK_DAMAGE, None, false)?;
            }
            ActionType::Skill => match skill_id {
                Some(skill) if skill == SkillId::new(8) => {
                    self.actor_mp = (self.actor_mp - FIRE_MP_COST).max(0);
                    self.hit_enemy(FIRE_DAMAGE, Some(skill), true)?;
                }
                other => {
                    // Focus and anything unknown: a quiet self-targeted action.
                    self.link.send(&ServerMessage::BattleActionResult {
                        subject: BattlerRef::party(0),
                        skill_id: other,
                        item_id: None,
                        targets: vec![TargetOutcome::hit(
                            BattlerRef::party(0),
                            0,
                            self.actor_hp,
                            self.actor_mp,
                        )],
                    })?;
                }
            },
            ActionType::Item => {
                self.actor_hp = (self.actor_hp + POTION_HEAL).min(ACTOR_MAX_HP);
                self.link.send(&ServerMessage::BattleActionResult {
                    subject: BattlerRef::party(0),
                    skill_id: None,
                    item_id,
                    targets: vec![TargetOutcome::hit(
                        BattlerRef::party(0),
                        -POTION_HEAL,
                        self.actor_hp,
                        self.actor_mp,
                    )],
                })?;
            }
        }

        if self.enemy_hp <= 0 {
            return self.link.send(&ServerMessage::BattleEnd {
                result: BattleResult::Victory,
                exp: 100,
                gold: 50,
                drops: vec![DropAward {
                    kind: ItemKind::Item,
                    id: 7,
                    quantity: 2,
                }],
            });
        }

        // Enemy counterattack, end-of-turn regen, next request.
        let damage = if self.guarding {
            ENEMY_DAMAGE / 2
        } else {
            ENEMY_DAMAGE
        };
        self.actor_hp = (self.actor_hp - damage).max(0);
        self.link.send(&ServerMessage::BattleActionResult {
            subject: BattlerRef::troop(0),
            skill_id: None,
            item_id: None,
            targets: vec![TargetOutcome::hit(
                BattlerRef::party(0),
                damage,
                self.actor_hp,
                self.actor_mp,
            )],
        })?;

        if self.actor_hp <= 0 {
            return self.link.send(&ServerMessage::BattleEnd {
                result: BattleResult::Defeat,
                exp: 0,
                gold: 0,
                drops: Vec::new(),
            });
        }

        self.actor_hp = (self.actor_hp + REGEN_HP).min(ACTOR_MAX_HP);
        self.link.send(&ServerMessage::BattleTurnEnd {
            regens: vec![RegenOutcome {
                battler: BattlerRef::party(0),
                hp: REGEN_HP,
                mp: 0,
                tp: 5,
            }],
        })?;
        self.link.send(&ServerMessage::BattleTurnStart {})?;
        self.link
            .send(&ServerMessage::BattleInputRequest { actor_index: 0 })
    }

    /// Damage the enemy and send the action result
    fn hit_enemy(&mut self, damage: i32, skill_id: Option<SkillId>, critical: bool) -> Result<()> {
        let was_above_half = self.enemy_hp * 2 > ENEMY_MAX_HP;
        self.enemy_hp = (self.enemy_hp - damage).max(0);

        let mut outcome = TargetOutcome::hit(BattlerRef::troop(0), damage, self.enemy_hp, 0);
        if critical {
            outcome = outcome.with_critical();
        }
        // Dropping below half enrages the slime, once.
        if was_above_half && self.enemy_hp * 2 <= ENEMY_MAX_HP && self.enemy_hp > 0 && !self.enraged
        {
            self.enraged = true;
            outcome = outcome.with_effects(vec![EffectId::new(4)]);
        }
        self.link.send(&ServerMessage::BattleActionResult {
            subject: BattlerRef::party(0),
            skill_id,
            item_id: None,
            targets: vec![outcome],
        })
    }
}

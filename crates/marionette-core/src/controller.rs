//! The puppet battle controller
//!
//! One instance owns everything the synchronization layer needs: the
//! session snapshot, the event queue, the animator, the input broker, the
//! flow switch, the effect interpreter, and the outbox. The host calls
//! [`PuppetController::advance`] once per render tick and routes inbound
//! server messages through [`PuppetController::handle_message`]; everything
//! else happens through the traits in [`crate::host`].

use crate::animator::ActionAnimator;
use crate::battler::{BattlerRef, PartyMember, StatOverride, TroopMember, Vitals};
use crate::config::SyncConfig;
use crate::defs::ContentDefs;
use crate::event::{BattleResult, CombatEvent, RewardBundle, TurnEndEvent};
use crate::flow::{BattleFlow, LocalFlow, PuppetFlow};
use crate::host::{Backdrop, BattleIo, HostBridge};
use crate::id::EffectId;
use crate::input::{CommandChoice, InputBroker};
use crate::interpreter::{Interpreter, ScriptCtx};
use crate::protocol::{ActorSetup, ClientMessage, EnemySetup, ServerMessage};
use crate::session::BattleSession;
use crate::transcript::{Direction, Transcript};
use indexmap::IndexMap;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Client-side synchronization layer for one server-driven battle at a time
pub struct PuppetController {
    config: SyncConfig,
    defs: ContentDefs,
    session: Option<BattleSession>,
    overrides: IndexMap<BattlerRef, StatOverride>,
    queue: VecDeque<CombatEvent>,
    animator: Option<ActionAnimator>,
    broker: InputBroker,
    flow: Box<dyn BattleFlow>,
    effect_queue: VecDeque<EffectId>,
    interpreter: Option<Interpreter>,
    outbox: VecDeque<ClientMessage>,
    transcript: Transcript,
    tick: u64,
}

impl PuppetController {
    /// Create a controller in local (pass-through) mode
    pub fn new(config: SyncConfig, defs: ContentDefs) -> Self {
        Self {
            config,
            defs,
            session: None,
            overrides: IndexMap::new(),
            queue: VecDeque::new(),
            animator: None,
            broker: InputBroker::new(),
            flow: Box::new(LocalFlow),
            effect_queue: VecDeque::new(),
            interpreter: None,
            outbox: VecDeque::new(),
            transcript: Transcript::new(),
            tick: 0,
        }
    }

    /// True while a puppet session is driving the battle
    pub fn puppet_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current roster snapshot, if a session is active
    pub fn session(&self) -> Option<&BattleSession> {
        self.session.as_ref()
    }

    /// Server-sent stat override for an identity, if one is installed
    ///
    /// Host stat lookups consult this first during a puppet battle.
    pub fn override_for(&self, battler: BattlerRef) -> Option<&StatOverride> {
        self.overrides.get(&battler)
    }

    /// Number of events waiting for playback
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// True while an action is mid-animation
    pub fn is_animating(&self) -> bool {
        self.animator.is_some()
    }

    /// The diagnostic transcript
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Active configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Next outbound message, if any
    pub fn poll_outbound(&mut self) -> Option<ClientMessage> {
        self.outbox.pop_front()
    }

    // ---------- inbound dispatch ----------

    /// Route one server message
    pub fn handle_message(&mut self, io: &mut BattleIo<'_>, message: ServerMessage) {
        self.transcript
            .record(self.tick, Direction::Inbound, server_summary(&message));
        match message {
            ServerMessage::BattleStart { actors, enemies } => {
                self.start_battle(io, actors, enemies);
            }
            ServerMessage::BattleInputRequest { actor_index } => {
                self.broker.request(actor_index);
            }
            ServerMessage::BattleTurnStart {} => {
                debug!("turn started");
            }
            ServerMessage::BattleActionResult {
                subject,
                skill_id,
                item_id,
                targets,
            } => {
                self.queue.push_back(CombatEvent::Action(crate::event::ActionEvent {
                    subject,
                    skill: skill_id,
                    item: item_id,
                    targets,
                }));
            }
            ServerMessage::BattleTurnEnd { regens } => {
                self.queue
                    .push_back(CombatEvent::TurnEnd(TurnEndEvent { regens }));
            }
            ServerMessage::BattleEnd {
                result,
                exp,
                gold,
                drops,
            } => {
                self.end_battle(io, result, RewardBundle { exp, gold, drops });
            }
        }
    }

    // ---------- session lifecycle ----------

    /// Open a puppet session from the server's roster
    ///
    /// Refuses (log, no session) when an enemy references a template the
    /// client has no definition for.
    fn start_battle(&mut self, io: &mut BattleIo<'_>, actors: Vec<ActorSetup>, enemies: Vec<EnemySetup>) {
        for enemy in &enemies {
            if self.defs.enemy(enemy.enemy_id).is_none() {
                warn!(enemy = %enemy.enemy_id, "unknown enemy template, refusing battle start");
                return;
            }
        }
        if self.session.is_some() {
            warn!("battle start while a session is active, replacing it");
        }
        self.reset_playback();

        let mut party = Vec::with_capacity(actors.len());
        for actor in actors {
            if !actor.overrides.is_empty() {
                self.overrides
                    .insert(BattlerRef::party(actor.index), actor.overrides.clone());
            }
            let vitals = Vitals {
                hp: actor.hp,
                max_hp: actor.max_hp,
                mp: actor.mp,
                max_mp: actor.max_mp,
                tp: actor.tp,
            };
            party.push(
                PartyMember::new(actor.index, actor.name, vitals)
                    .with_attack_animation(actor.attack_animation),
            );
        }

        let mut troop = Vec::with_capacity(enemies.len());
        for (index, enemy) in enemies.into_iter().enumerate() {
            // Presence checked above.
            let Some(def) = self.defs.enemy(enemy.enemy_id) else {
                continue;
            };
            let vitals = Vitals {
                hp: enemy.hp,
                max_hp: enemy.max_hp,
                mp: enemy.mp,
                max_mp: enemy.max_mp,
                tp: 0,
            };
            let slot = self.config.layout.slot_for(index);
            let member = TroopMember::new(index, enemy.enemy_id, def.name.clone(), vitals)
                .with_attack_animation(def.attack_animation)
                .with_slot(slot);
            io.stage.place_enemy(index, &member.name, slot);
            troop.push(member);
        }

        let session = BattleSession::new(party, troop);
        info!(
            party = session.party.len(),
            troop = session.troop.len(),
            "puppet session opened"
        );
        io.gate.lock();
        io.stage.set_backdrop(Backdrop::Battle);
        io.host.sync_party(&session.party);
        self.session = Some(session);
        self.flow = Box::new(PuppetFlow::new());
        self.transcript
            .record(self.tick, Direction::Note, "session opened");
    }

    /// Close the session: rewards, one-shot finalization, ack
    fn end_battle(&mut self, io: &mut BattleIo<'_>, result: BattleResult, rewards: RewardBundle) {
        let Some(session) = self.session.as_ref() else {
            debug!(?result, "battle end with no session, ignoring");
            return;
        };

        if result == BattleResult::Victory && self.config.grant_local_rewards {
            for member in session.living_party() {
                io.host.gain_exp(member.index, rewards.exp);
            }
            if rewards.gold != 0 {
                io.host.gain_gold(rewards.gold);
            }
            for drop in &rewards.drops {
                io.host.gain_item(drop.kind, drop.id, drop.quantity);
            }
        }

        if !self.queue.is_empty() {
            warn!(
                discarded = self.queue.len(),
                "battle ended with unplayed events"
            );
        }
        self.overrides.clear();
        self.reset_playback();

        self.flow.arm_finalize();
        self.flow.finish(io.host, result);

        io.stage.set_backdrop(Backdrop::Map);
        io.gate.release();
        self.outbox.push_back(ClientMessage::BattleResultAck { result });
        self.transcript
            .record(self.tick, Direction::Outbound, "battle_result_ack");

        self.session = None;
        self.flow = Box::new(LocalFlow);
        info!(?result, "puppet session closed");
    }

    fn reset_playback(&mut self) {
        self.queue.clear();
        self.animator = None;
        self.interpreter = None;
        self.effect_queue.clear();
        self.broker.reset();
    }

    // ---------- playback driver ----------

    /// Drive exactly one concern for this tick
    ///
    /// Priority order: effect interpreter, then the in-flight animation,
    /// then the next queued event, then a pending input request. Returning
    /// after each branch is what keeps regen, actions, and input from ever
    /// interleaving.
    pub fn advance(&mut self, io: &mut BattleIo<'_>) {
        self.tick += 1;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        // 1. A running (or startable) secondary-effect block wins the tick.
        if self.interpreter.is_none() {
            while let Some(effect) = self.effect_queue.pop_front() {
                match self.defs.effect(effect) {
                    Some(def) => {
                        self.interpreter = Some(Interpreter::new(effect, def.commands.clone()));
                        break;
                    }
                    None => debug!(%effect, "unknown effect block, dropping"),
                }
            }
        }
        if let Some(mut interpreter) = self.interpreter.take() {
            {
                let mut shared = io.gate.grant();
                let mut ctx = ScriptCtx {
                    shared: &mut *shared,
                    session: &mut *session,
                    stage: &mut *io.stage,
                    defs: &self.defs,
                };
                interpreter.tick(&mut ctx);
            }
            if interpreter.is_running() {
                self.interpreter = Some(interpreter);
            } else {
                debug!(effect = %interpreter.effect(), "effect block finished");
            }
            return;
        }

        // 2. An in-flight action keeps animating.
        if let Some(mut animator) = self.animator.take() {
            let complete = animator.tick(
                session,
                io.host,
                io.stage,
                &self.config.timing,
                &mut self.effect_queue,
            );
            if !complete {
                self.animator = Some(animator);
            }
            return;
        }

        // 3. Dequeue the next event.
        if let Some(event) = self.queue.pop_front() {
            match event {
                CombatEvent::Action(action) => {
                    self.animator = ActionAnimator::start(
                        action,
                        session,
                        &self.defs,
                        io.stage,
                        &mut self.effect_queue,
                    );
                }
                CombatEvent::TurnEnd(turn) => {
                    for regen in &turn.regens {
                        match session.vitals_mut(regen.battler) {
                            Some(vitals) => vitals.regen(regen.hp, regen.mp, regen.tp),
                            None => {
                                debug!(battler = %regen.battler, "regen target not found, skipping")
                            }
                        }
                    }
                    io.host.refresh_status();
                }
            }
            return;
        }

        // 4. Only a quiet scene may open the command window.
        if self.broker.has_pending() {
            self.broker.try_activate(session, io.host);
        }
    }

    // ---------- host phase hooks ----------

    /// Host hook: input-phase setup
    pub fn hook_start_input(&mut self, host: &mut dyn HostBridge) {
        self.flow.start_input(host);
    }

    /// Host hook: turn construction
    pub fn hook_start_turn(&mut self, host: &mut dyn HostBridge) {
        self.flow.start_turn(host);
    }

    /// Host hook: per-tick action processing
    pub fn hook_update_action(&mut self, host: &mut dyn HostBridge) {
        self.flow.update_action(host);
    }

    /// Host hook: action teardown
    pub fn hook_end_action(&mut self, host: &mut dyn HostBridge) {
        self.flow.end_action(host);
    }

    /// Host hook: troop event-page setup
    pub fn hook_setup_troop_events(&mut self, host: &mut dyn HostBridge) {
        self.flow.setup_troop_events(host);
    }

    /// Host hook: has the battle ended?
    pub fn hook_battle_ended(&self, host: &dyn HostBridge) -> bool {
        self.flow.battle_ended(host)
    }

    /// Host hook: is an abort requested?
    pub fn hook_abort_requested(&self, host: &dyn HostBridge) -> bool {
        self.flow.abort_requested(host)
    }

    // ---------- UI callbacks ----------

    /// The player picked a command from the host's menu
    pub fn command_chosen(&mut self, io: &mut BattleIo<'_>, choice: CommandChoice) {
        if let Some(message) = self.broker.choose(choice, &self.defs, io.host) {
            self.push_outbound(message);
        }
    }

    /// The player confirmed a target in the open picker
    pub fn target_confirmed(&mut self, io: &mut BattleIo<'_>, target_index: usize) {
        if let Some(message) = self.broker.confirm_target(target_index, io.host) {
            self.push_outbound(message);
        }
    }

    /// The player backed out of the open picker
    pub fn target_cancelled(&mut self, io: &mut BattleIo<'_>) {
        self.broker.cancel_target(io.host);
    }

    fn push_outbound(&mut self, message: ClientMessage) {
        self.transcript
            .record(self.tick, Direction::Outbound, client_summary(&message));
        self.outbox.push_back(message);
    }
}

fn server_summary(message: &ServerMessage) -> &'static str {
    match message {
        ServerMessage::BattleStart { .. } => "battle_start",
        ServerMessage::BattleInputRequest { .. } => "battle_input_request",
        ServerMessage::BattleTurnStart {} => "battle_turn_start",
        ServerMessage::BattleActionResult { .. } => "battle_action_result",
        ServerMessage::BattleTurnEnd { .. } => "battle_turn_end",
        ServerMessage::BattleEnd { .. } => "battle_end",
    }
}

fn client_summary(message: &ClientMessage) -> &'static str {
    match message {
        ClientMessage::BattleInput { .. } => "battle_input",
        ClientMessage::BattleResultAck { .. } => "battle_result_ack",
    }
}

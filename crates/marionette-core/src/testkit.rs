//! Recording fakes of the host seams, shared by the unit tests

use crate::battler::{BattlerRef, PartyMember};
use crate::event::{BattleResult, ItemKind};
use crate::gate::GateCell;
use crate::host::{Backdrop, BattleIo, HostBridge, Stage};
use crate::id::AnimationId;

/// Stage fake that records every call
pub(crate) struct RecordingStage {
    pub backdrops: Vec<Backdrop>,
    pub placed: Vec<(usize, String, (i32, i32))>,
    pub animations: Vec<(BattlerRef, AnimationId)>,
    pub flashes: Vec<BattlerRef>,
    pub damage: Vec<(BattlerRef, i32, bool)>,
    pub misses: Vec<BattlerRef>,
    pub messages: Vec<String>,
    pub collapses: Vec<BattlerRef>,
    pub action_ends: Vec<BattlerRef>,
    /// What `animation_playing` answers
    pub playing: bool,
}

impl RecordingStage {
    pub fn new() -> Self {
        Self {
            backdrops: Vec::new(),
            placed: Vec::new(),
            animations: Vec::new(),
            flashes: Vec::new(),
            damage: Vec::new(),
            misses: Vec::new(),
            messages: Vec::new(),
            collapses: Vec::new(),
            action_ends: Vec::new(),
            playing: false,
        }
    }
}

impl Stage for RecordingStage {
    fn set_backdrop(&mut self, backdrop: Backdrop) {
        self.backdrops.push(backdrop);
    }

    fn place_enemy(&mut self, index: usize, name: &str, slot: (i32, i32)) {
        self.placed.push((index, name.to_string(), slot));
    }

    fn play_animation(&mut self, target: BattlerRef, animation: AnimationId) {
        self.animations.push((target, animation));
    }

    fn flash(&mut self, subject: BattlerRef) {
        self.flashes.push(subject);
    }

    fn animation_playing(&self) -> bool {
        self.playing
    }

    fn show_damage(&mut self, target: BattlerRef, damage: i32, critical: bool) {
        self.damage.push((target, damage, critical));
    }

    fn show_miss(&mut self, target: BattlerRef) {
        self.misses.push(target);
    }

    fn show_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn play_collapse(&mut self, target: BattlerRef) {
        self.collapses.push(target);
    }

    fn end_action(&mut self, subject: BattlerRef) {
        self.action_ends.push(subject);
    }
}

/// Host fake that records services and native-hook calls
pub(crate) struct RecordingHost {
    pub synced: Vec<Vec<PartyMember>>,
    pub refreshes: usize,
    pub ui_ready: bool,
    pub inputs_opened: Vec<usize>,
    pub waits: usize,
    pub enemy_pickers: usize,
    pub ally_pickers: usize,
    pub reopened: Vec<usize>,
    pub exp: Vec<(usize, i32)>,
    pub gold: i32,
    pub items: Vec<(ItemKind, u32, u32)>,
    pub finalized: Vec<BattleResult>,
    pub native_calls: Vec<&'static str>,
    /// What `native_battle_ended` answers
    pub ended_locally: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            synced: Vec::new(),
            refreshes: 0,
            ui_ready: true,
            inputs_opened: Vec::new(),
            waits: 0,
            enemy_pickers: 0,
            ally_pickers: 0,
            reopened: Vec::new(),
            exp: Vec::new(),
            gold: 0,
            items: Vec::new(),
            finalized: Vec::new(),
            native_calls: Vec::new(),
            ended_locally: false,
        }
    }
}

impl HostBridge for RecordingHost {
    fn sync_party(&mut self, members: &[PartyMember]) {
        self.synced.push(members.to_vec());
    }

    fn refresh_status(&mut self) {
        self.refreshes += 1;
    }

    fn command_ui_ready(&self) -> bool {
        self.ui_ready
    }

    fn begin_input(&mut self, actor_index: usize) {
        self.inputs_opened.push(actor_index);
    }

    fn begin_waiting(&mut self) {
        self.waits += 1;
    }

    fn open_enemy_picker(&mut self) {
        self.enemy_pickers += 1;
    }

    fn open_ally_picker(&mut self) {
        self.ally_pickers += 1;
    }

    fn reopen_command_menu(&mut self, actor_index: usize) {
        self.reopened.push(actor_index);
    }

    fn gain_exp(&mut self, actor_index: usize, amount: i32) {
        self.exp.push((actor_index, amount));
    }

    fn gain_gold(&mut self, amount: i32) {
        self.gold += amount;
    }

    fn gain_item(&mut self, kind: ItemKind, id: u32, quantity: u32) {
        self.items.push((kind, id, quantity));
    }

    fn native_start_input(&mut self) {
        self.native_calls.push("start_input");
    }

    fn native_start_turn(&mut self) {
        self.native_calls.push("start_turn");
    }

    fn native_update_action(&mut self) {
        self.native_calls.push("update_action");
    }

    fn native_end_action(&mut self) {
        self.native_calls.push("end_action");
    }

    fn native_setup_troop_events(&mut self) {
        self.native_calls.push("setup_troop_events");
    }

    fn native_battle_ended(&self) -> bool {
        self.ended_locally
    }

    fn native_abort_requested(&self) -> bool {
        false
    }

    fn native_finalize(&mut self, result: BattleResult) {
        self.finalized.push(result);
    }
}

/// Assemble a [`BattleIo`] over the fakes
pub(crate) fn io<'a>(
    host: &'a mut RecordingHost,
    stage: &'a mut RecordingStage,
    gate: &'a mut GateCell,
) -> BattleIo<'a> {
    BattleIo {
        host,
        stage,
        gate,
    }
}

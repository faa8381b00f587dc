//! Reference host implementations for the terminal demo
//!
//! `SimHost` stands in for the host engine's party and window layer;
//! `SimStage` for its battle scene. Both just record enough state for the
//! renderer and answer the controller's questions honestly: animations
//! "play" for a fixed number of ticks, the command UI is ready once the
//! roster is synced.

use marionette_core::{
    AnimationId, Backdrop, BattleResult, BattlerRef, HostBridge, ItemKind, PartyMember, Stage,
};

/// Ticks a requested animation stays "playing"
const ANIMATION_TICKS: u32 = 18;

/// What the host UI is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Hidden,
    Command { actor: usize, cursor: usize },
    EnemyPicker { cursor: usize },
    AllyPicker { cursor: usize },
}

/// Host-engine stand-in: party mirror, windows, rewards
pub struct SimHost {
    pub party: Vec<PartyMember>,
    pub menu: Menu,
    pub gold: i32,
    pub exp: Vec<(usize, i32)>,
    pub items: Vec<(ItemKind, u32, u32)>,
    pub finalized: Option<BattleResult>,
}

impl SimHost {
    pub fn new() -> Self {
        Self {
            party: Vec::new(),
            menu: Menu::Hidden,
            gold: 0,
            exp: Vec::new(),
            items: Vec::new(),
            finalized: None,
        }
    }
}

impl HostBridge for SimHost {
    fn sync_party(&mut self, members: &[PartyMember]) {
        self.party = members.to_vec();
    }

    fn refresh_status(&mut self) {
        // The demo redraws everything every frame.
    }

    fn command_ui_ready(&self) -> bool {
        !self.party.is_empty()
    }

    fn begin_input(&mut self, actor_index: usize) {
        self.menu = Menu::Command {
            actor: actor_index,
            cursor: 0,
        };
    }

    fn begin_waiting(&mut self) {
        self.menu = Menu::Hidden;
    }

    fn open_enemy_picker(&mut self) {
        self.menu = Menu::EnemyPicker { cursor: 0 };
    }

    fn open_ally_picker(&mut self) {
        self.menu = Menu::AllyPicker { cursor: 0 };
    }

    fn reopen_command_menu(&mut self, actor_index: usize) {
        self.menu = Menu::Command {
            actor: actor_index,
            cursor: 0,
        };
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

    fn native_finalize(&mut self, result: BattleResult) {
        self.finalized = Some(result);
    }
}

/// Battle-scene stand-in: popups and placements go to a scrolling log
pub struct SimStage {
    pub log: Vec<String>,
    pub in_battle: bool,
    animation_ticks: u32,
}

impl SimStage {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            in_battle: false,
            animation_ticks: 0,
        }
    }

    /// Advance the fake animation clock one render tick
    pub fn step(&mut self) {
        self.animation_ticks = self.animation_ticks.saturating_sub(1);
    }

    fn push_log(&mut self, line: String) {
        self.log.push(line);
        let excess = self.log.len().saturating_sub(200);
        if excess > 0 {
            self.log.drain(..excess);
        }
    }
}

impl Stage for SimStage {
    fn set_backdrop(&mut self, backdrop: Backdrop) {
        self.in_battle = backdrop == Backdrop::Battle;
    }

    fn place_enemy(&mut self, _index: usize, name: &str, _slot: (i32, i32)) {
        self.push_log(format!("{} appears!", name));
    }

    fn play_animation(&mut self, _target: BattlerRef, _animation: AnimationId) {
        self.animation_ticks = ANIMATION_TICKS;
    }

    fn flash(&mut self, _subject: BattlerRef) {}

    fn animation_playing(&self) -> bool {
        self.animation_ticks > 0
    }

    fn show_damage(&mut self, target: BattlerRef, damage: i32, critical: bool) {
        let mark = if critical { " (critical!)" } else { "" };
        self.push_log(format!("{} takes {} damage{}", target, damage, mark));
    }

    fn show_miss(&mut self, target: BattlerRef) {
        self.push_log(format!("{} evades the attack", target));
    }

    fn show_message(&mut self, text: &str) {
        self.push_log(text.to_string());
    }

    fn play_collapse(&mut self, target: BattlerRef) {
        self.push_log(format!("{} is defeated!", target));
    }

    fn end_action(&mut self, _subject: BattlerRef) {}
}

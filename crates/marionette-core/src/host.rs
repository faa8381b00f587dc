//! Seams toward the host engine
//!
//! The controller never reaches into the host's scenes or windows. Two
//! traits are the whole surface: [`HostBridge`] for engine services and
//! the native phase handlers puppet mode suppresses, [`Stage`] for
//! presentation. Hosts pass both (plus the shared-state gate) into every
//! controller call through [`BattleIo`], so tests can hand in recording
//! fakes and inspect them afterwards.

use crate::battler::{BattlerRef, PartyMember};
use crate::event::{BattleResult, ItemKind};
use crate::gate::GateCell;
use crate::id::AnimationId;

/// What the battle scene renders behind the battlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    /// Battle backdrop; the map stops rendering underneath
    Battle,
    /// The ordinary map view, restored when the battle closes
    Map,
}

/// Engine services and native phase handlers
///
/// The `native_*` methods are the host's own battle logic at the exact
/// points puppet mode takes over. Hosts without a local battle loop can
/// leave the defaults.
pub trait HostBridge {
    /// Materialize the roster into the host's party structures
    fn sync_party(&mut self, members: &[PartyMember]);

    /// Redraw hp/mp/tp and status displays
    fn refresh_status(&mut self);

    /// True when the command window can accept a new actor
    fn command_ui_ready(&self) -> bool;

    /// Point the turn at an actor and open the command window
    fn begin_input(&mut self, actor_index: usize);

    /// Close input surfaces and show the waiting scene
    fn begin_waiting(&mut self);

    /// Open the enemy target picker
    fn open_enemy_picker(&mut self);

    /// Open the ally target picker
    fn open_ally_picker(&mut self);

    /// Return from a picker to the command window for the same actor
    fn reopen_command_menu(&mut self, actor_index: usize);

    /// Grant experience to one actor
    fn gain_exp(&mut self, actor_index: usize, amount: i32);

    /// Grant currency to the party
    fn gain_gold(&mut self, amount: i32);

    /// Grant a dropped reward to the inventory
    fn gain_item(&mut self, kind: ItemKind, id: u32, quantity: u32);

    // === Native phase handlers ===

    /// The host's own input-phase setup
    fn native_start_input(&mut self) {}

    /// The host's own turn construction
    fn native_start_turn(&mut self) {}

    /// The host's own per-tick action processing
    fn native_update_action(&mut self) {}

    /// The host's own action teardown
    fn native_end_action(&mut self) {}

    /// The host's own troop event-page setup
    fn native_setup_troop_events(&mut self) {}

    /// The host's own victory/defeat detection
    fn native_battle_ended(&self) -> bool {
        false
    }

    /// The host's own abort detection
    fn native_abort_requested(&self) -> bool {
        false
    }

    /// The host's terminal processing (victory fanfare, game over, escape)
    fn native_finalize(&mut self, result: BattleResult) {
        let _ = result;
    }
}

/// Presentation capabilities of the battle scene
pub trait Stage {
    /// Switch what renders behind the battlers
    fn set_backdrop(&mut self, backdrop: Backdrop);

    /// Create or refresh an enemy sprite at a screen slot
    fn place_enemy(&mut self, index: usize, name: &str, slot: (i32, i32));

    /// Start a battle animation on a target
    fn play_animation(&mut self, target: BattlerRef, animation: AnimationId);

    /// Brief acting highlight on a battler
    fn flash(&mut self, subject: BattlerRef);

    /// True while any requested animation is still running
    ///
    /// Hosts are allowed to be sloppy here; the animator's dwell and
    /// ceiling bound the damage a wrong answer can do.
    fn animation_playing(&self) -> bool;

    /// Damage popup over a target
    fn show_damage(&mut self, target: BattlerRef, damage: i32, critical: bool);

    /// Evade popup over a target
    fn show_miss(&mut self, target: BattlerRef);

    /// Line of battle-log text
    fn show_message(&mut self, text: &str);

    /// Collapse effect for a battler reaching zero hp
    fn play_collapse(&mut self, target: BattlerRef);

    /// Return a battler's sprite to its idle pose
    fn end_action(&mut self, subject: BattlerRef);
}

/// Everything a controller call may touch on the host side
///
/// Borrowed per call, mirroring how the runtime takes its model as a
/// parameter instead of owning it.
pub struct BattleIo<'a> {
    pub host: &'a mut dyn HostBridge,
    pub stage: &'a mut dyn Stage,
    pub gate: &'a mut GateCell,
}

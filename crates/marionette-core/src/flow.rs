//! Battle flow selection: host-driven or puppet-driven
//!
//! The host engine calls the controller's hook methods at its own phase
//! points. Which behavior those hooks get is an explicit mode switch: a
//! [`BattleFlow`] chosen when a puppet session starts and dropped when it
//! ends. Outside puppet mode every hook passes straight through to the
//! host's native handlers; inside it they all go quiet, and the only way
//! anything terminal happens is the controller arming the one-shot
//! finalize gate itself.

use crate::event::BattleResult;
use crate::host::HostBridge;
use tracing::{debug, warn};

/// Behavior behind the host engine's phase hooks
pub trait BattleFlow {
    /// Input-phase setup
    fn start_input(&mut self, host: &mut dyn HostBridge);

    /// Turn construction
    fn start_turn(&mut self, host: &mut dyn HostBridge);

    /// Per-tick action processing
    fn update_action(&mut self, host: &mut dyn HostBridge);

    /// Action teardown
    fn end_action(&mut self, host: &mut dyn HostBridge);

    /// Troop event-page setup
    fn setup_troop_events(&mut self, host: &mut dyn HostBridge);

    /// Has the battle ended by the host's own rules?
    fn battle_ended(&self, host: &dyn HostBridge) -> bool;

    /// Is the host asking to abort the battle?
    fn abort_requested(&self, host: &dyn HostBridge) -> bool;

    /// Allow exactly one terminal transition through
    ///
    /// Meaningful only in puppet mode; the local flow never blocks
    /// finalization in the first place.
    fn arm_finalize(&mut self) {}

    /// Run terminal processing for a result
    fn finish(&mut self, host: &mut dyn HostBridge, result: BattleResult);
}

/// Transparent pass-through to the host's own battle logic
#[derive(Debug, Default)]
pub struct LocalFlow;

impl BattleFlow for LocalFlow {
    fn start_input(&mut self, host: &mut dyn HostBridge) {
        host.native_start_input();
    }

    fn start_turn(&mut self, host: &mut dyn HostBridge) {
        host.native_start_turn();
    }

    fn update_action(&mut self, host: &mut dyn HostBridge) {
        host.native_update_action();
    }

    fn end_action(&mut self, host: &mut dyn HostBridge) {
        host.native_end_action();
    }

    fn setup_troop_events(&mut self, host: &mut dyn HostBridge) {
        host.native_setup_troop_events();
    }

    fn battle_ended(&self, host: &dyn HostBridge) -> bool {
        host.native_battle_ended()
    }

    fn abort_requested(&self, host: &dyn HostBridge) -> bool {
        host.native_abort_requested()
    }

    fn finish(&mut self, host: &mut dyn HostBridge, result: BattleResult) {
        host.native_finalize(result);
    }
}

/// Suppresses the host's battle logic while the server drives
#[derive(Debug, Default)]
pub struct PuppetFlow {
    finalize_armed: bool,
    finalized: bool,
}

impl PuppetFlow {
    /// Create a flow with the finalize gate closed
    pub fn new() -> Self {
        Self::default()
    }
}

impl BattleFlow for PuppetFlow {
    fn start_input(&mut self, _host: &mut dyn HostBridge) {}

    fn start_turn(&mut self, _host: &mut dyn HostBridge) {}

    fn update_action(&mut self, _host: &mut dyn HostBridge) {}

    fn end_action(&mut self, _host: &mut dyn HostBridge) {}

    fn setup_troop_events(&mut self, _host: &mut dyn HostBridge) {}

    fn battle_ended(&self, _host: &dyn HostBridge) -> bool {
        // Only the server ends a puppet battle.
        false
    }

    fn abort_requested(&self, _host: &dyn HostBridge) -> bool {
        false
    }

    fn arm_finalize(&mut self) {
        self.finalize_armed = true;
    }

    fn finish(&mut self, host: &mut dyn HostBridge, result: BattleResult) {
        if !self.finalize_armed {
            debug!(?result, "finalize suppressed, gate not armed");
            return;
        }
        if self.finalized {
            warn!(?result, "finalize called twice, ignoring");
            return;
        }
        self.finalized = true;
        host.native_finalize(result);
    }
}

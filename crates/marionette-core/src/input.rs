//! Input brokering between the server's turn requests and the host UI
//!
//! The server asks for one actor's command at a time. The broker buffers
//! that request until the playback driver says the scene is quiet, drives
//! the host's command and target windows, and translates the final choice
//! into exactly one outbound message. If the UI is not ready the request
//! stays buffered and is retried next tick; nothing is ever dropped on a
//! race.

use crate::defs::{ContentDefs, TargetScope};
use crate::host::HostBridge;
use crate::id::{ItemId, SkillId};
use crate::protocol::{ActionType, ClientMessage};
use crate::session::BattleSession;
use tracing::{debug, warn};

/// The server's outstanding "choose a command" request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingInput {
    /// Which party member the server wants a command for
    pub actor_index: usize,
}

/// A command the player picked from the host's menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandChoice {
    Attack,
    Skill(SkillId),
    Item(ItemId),
    Guard,
    Flee,
}

/// What the broker is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No actor is choosing
    Idle,
    /// The command menu is open for an actor
    Command { actor: usize },
    /// A target picker is open, remembering what was chosen
    Picking { actor: usize, choice: PickerChoice },
}

/// The command a target picker is collecting a target for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerChoice {
    Attack,
    Skill(SkillId, TargetScope),
    Item(ItemId, TargetScope),
}

/// Buffers input requests and walks the host UI through one decision
#[derive(Debug)]
pub struct InputBroker {
    pending: Option<PendingInput>,
    phase: Phase,
}

impl InputBroker {
    /// Create an idle broker
    pub fn new() -> Self {
        Self {
            pending: None,
            phase: Phase::Idle,
        }
    }

    /// Buffer a request from the server
    ///
    /// At most one request is outstanding; a newer one replaces it.
    pub fn request(&mut self, actor_index: usize) {
        if let Some(old) = self.pending.replace(PendingInput { actor_index }) {
            if old.actor_index != actor_index {
                warn!(
                    old = old.actor_index,
                    new = actor_index,
                    "input request replaced before activation"
                );
            }
        }
    }

    /// True while a request waits for activation
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// True while a command menu or picker is open
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Drop all buffered and in-progress input
    pub fn reset(&mut self) {
        self.pending = None;
        self.phase = Phase::Idle;
    }

    /// Try to hand the buffered request to the host UI
    ///
    /// Called by the driver only when the queue is empty and nothing is
    /// animating. Re-syncs the roster into the host first so the command
    /// window never opens over stale party data. Returns true when the
    /// command menu opened.
    pub fn try_activate(&mut self, session: &BattleSession, host: &mut dyn HostBridge) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };

        if session.party_member(pending.actor_index).is_none() {
            warn!(
                actor = pending.actor_index,
                "input requested for unknown actor, dropping"
            );
            self.pending = None;
            return false;
        }

        host.sync_party(&session.party);
        if !host.command_ui_ready() {
            // Not an error; retried next tick.
            return false;
        }

        self.pending = None;
        self.phase = Phase::Command {
            actor: pending.actor_index,
        };
        host.begin_input(pending.actor_index);
        true
    }

    /// The player picked a command from the menu
    ///
    /// Returns the outbound message when the choice needs no target;
    /// otherwise opens the right picker and returns nothing yet.
    pub fn choose(
        &mut self,
        choice: CommandChoice,
        defs: &ContentDefs,
        host: &mut dyn HostBridge,
    ) -> Option<ClientMessage> {
        let Phase::Command { actor } = self.phase else {
            debug!("command chosen with no actor in input phase, ignoring");
            return None;
        };

        match choice {
            CommandChoice::Guard => Some(self.send(actor, ActionType::Guard, None, None, Vec::new(), false, host)),
            CommandChoice::Flee => Some(self.send(actor, ActionType::Flee, None, None, Vec::new(), false, host)),
            CommandChoice::Attack => {
                self.phase = Phase::Picking {
                    actor,
                    choice: PickerChoice::Attack,
                };
                host.open_enemy_picker();
                None
            }
            CommandChoice::Skill(skill) => {
                let Some(def) = defs.skill(skill) else {
                    debug!(%skill, "chosen skill no longer resolves, dropping");
                    host.reopen_command_menu(actor);
                    return None;
                };
                self.route_scoped(actor, PickerChoice::Skill(skill, def.scope), host)
            }
            CommandChoice::Item(item) => {
                let Some(def) = defs.item(item) else {
                    debug!(%item, "chosen item no longer resolves, dropping");
                    host.reopen_command_menu(actor);
                    return None;
                };
                self.route_scoped(actor, PickerChoice::Item(item, def.scope), host)
            }
        }
    }

    /// The player confirmed a target in the open picker
    pub fn confirm_target(
        &mut self,
        target_index: usize,
        host: &mut dyn HostBridge,
    ) -> Option<ClientMessage> {
        let Phase::Picking { actor, choice } = self.phase else {
            debug!("target confirmed with no picker open, ignoring");
            return None;
        };

        let message = match choice {
            PickerChoice::Attack => self.send(
                actor,
                ActionType::Attack,
                None,
                None,
                vec![target_index],
                false,
                host,
            ),
            PickerChoice::Skill(skill, scope) => self.send(
                actor,
                ActionType::Skill,
                Some(skill),
                None,
                vec![target_index],
                scope == TargetScope::Ally,
                host,
            ),
            PickerChoice::Item(item, scope) => self.send(
                actor,
                ActionType::Item,
                None,
                Some(item),
                vec![target_index],
                scope == TargetScope::Ally,
                host,
            ),
        };
        Some(message)
    }

    /// The player backed out of the open picker
    ///
    /// Returns to the command menu for the same actor; nothing is sent.
    pub fn cancel_target(&mut self, host: &mut dyn HostBridge) {
        if let Phase::Picking { actor, .. } = self.phase {
            self.phase = Phase::Command { actor };
            host.reopen_command_menu(actor);
        }
    }

    /// Send scoped skills and items to a picker or straight out
    fn route_scoped(
        &mut self,
        actor: usize,
        choice: PickerChoice,
        host: &mut dyn HostBridge,
    ) -> Option<ClientMessage> {
        let scope = match choice {
            PickerChoice::Skill(_, scope) | PickerChoice::Item(_, scope) => scope,
            PickerChoice::Attack => TargetScope::Enemy,
        };
        match scope {
            TargetScope::Enemy => {
                self.phase = Phase::Picking { actor, choice };
                host.open_enemy_picker();
                None
            }
            TargetScope::Ally => {
                self.phase = Phase::Picking { actor, choice };
                host.open_ally_picker();
                None
            }
            TargetScope::User => {
                let (action_type, skill, item) = split_choice(choice);
                Some(self.send(actor, action_type, skill, item, vec![actor], true, host))
            }
            TargetScope::None => {
                let (action_type, skill, item) = split_choice(choice);
                Some(self.send(actor, action_type, skill, item, Vec::new(), false, host))
            }
        }
    }

    /// Build the outbound message and return the scene to waiting
    #[allow(clippy::too_many_arguments)]
    fn send(
        &mut self,
        actor: usize,
        action_type: ActionType,
        skill_id: Option<SkillId>,
        item_id: Option<ItemId>,
        target_indices: Vec<usize>,
        target_is_actor: bool,
        host: &mut dyn HostBridge,
    ) -> ClientMessage {
        self.phase = Phase::Idle;
        host.begin_waiting();
        ClientMessage::BattleInput {
            actor_index: actor,
            action_type,
            skill_id,
            item_id,
            target_indices,
            target_is_actor,
        }
    }
}

impl Default for InputBroker {
    fn default() -> Self {
        Self::new()
    }
}

fn split_choice(choice: PickerChoice) -> (ActionType, Option<SkillId>, Option<ItemId>) {
    match choice {
        PickerChoice::Attack => (ActionType::Attack, None, None),
        PickerChoice::Skill(skill, _) => (ActionType::Skill, Some(skill), None),
        PickerChoice::Item(item, _) => (ActionType::Item, None, Some(item)),
    }
}

//! High-level battle client pump
//!
//! Owns the typed link and the puppet controller, and exposes one call
//! the host runs every render tick: drain inbound messages into the
//! controller, advance playback by one step, drain the outbox back onto
//! the wire.

use crate::error::Result;
use crate::link::Link;
use crate::transport::Transport;
use marionette_core::{BattleIo, ClientMessage, PuppetController, ServerMessage};

/// One server-driven battle client over a transport
pub struct BattleClient<T: Transport> {
    link: Link<T, ServerMessage, ClientMessage>,
    controller: PuppetController,
}

impl<T: Transport> BattleClient<T> {
    /// Wire a controller to a transport
    pub fn new(transport: T, controller: PuppetController) -> Self {
        Self {
            link: Link::new(transport),
            controller,
        }
    }

    /// Run one tick: inbound, playback, outbound
    pub fn pump(&mut self, io: &mut BattleIo<'_>) -> Result<()> {
        while let Some(message) = self.link.poll()? {
            self.controller.handle_message(io, message);
        }
        self.controller.advance(io);
        while let Some(message) = self.controller.poll_outbound() {
            self.link.send(&message)?;
        }
        Ok(())
    }

    /// The controller, for hooks and UI callbacks
    pub fn controller(&self) -> &PuppetController {
        &self.controller
    }

    /// The controller, mutably
    pub fn controller_mut(&mut self) -> &mut PuppetController {
        &mut self.controller
    }

    /// The link, for direct sends outside the pump
    pub fn link_mut(&mut self) -> &mut Link<T, ServerMessage, ClientMessage> {
        &mut self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryTransport;
    use marionette_core::{
        ActorSetup, AnimationId, Backdrop, BattleResult, BattlerRef, ContentDefs, EnemyDef,
        EnemySetup, EnemyId, GateCell, HostBridge, ItemKind, PartyMember, SharedState, Stage,
        SyncConfig,
    };

    struct NullHost;

    impl HostBridge for NullHost {
        fn sync_party(&mut self, _members: &[PartyMember]) {}
        fn refresh_status(&mut self) {}
        fn command_ui_ready(&self) -> bool {
            true
        }
        fn begin_input(&mut self, _actor_index: usize) {}
        fn begin_waiting(&mut self) {}
        fn open_enemy_picker(&mut self) {}
        fn open_ally_picker(&mut self) {}
        fn reopen_command_menu(&mut self, _actor_index: usize) {}
        fn gain_exp(&mut self, _actor_index: usize, _amount: i32) {}
        fn gain_gold(&mut self, _amount: i32) {}
        fn gain_item(&mut self, _kind: ItemKind, _id: u32, _quantity: u32) {}
    }

    struct NullStage;

    impl Stage for NullStage {
        fn set_backdrop(&mut self, _backdrop: Backdrop) {}
        fn place_enemy(&mut self, _index: usize, _name: &str, _slot: (i32, i32)) {}
        fn play_animation(&mut self, _target: BattlerRef, _animation: AnimationId) {}
        fn flash(&mut self, _subject: BattlerRef) {}
        fn animation_playing(&self) -> bool {
            false
        }
        fn show_damage(&mut self, _target: BattlerRef, _damage: i32, _critical: bool) {}
        fn show_miss(&mut self, _target: BattlerRef) {}
        fn show_message(&mut self, _text: &str) {}
        fn play_collapse(&mut self, _target: BattlerRef) {}
        fn end_action(&mut self, _subject: BattlerRef) {}
    }

    fn defs() -> ContentDefs {
        let mut defs = ContentDefs::new();
        defs.enemies.insert(
            EnemyId::new(3),
            EnemyDef {
                id: EnemyId::new(3),
                name: "Slime".into(),
                attack_animation: AnimationId::new(6),
            },
        );
        defs
    }

    #[test]
    fn test_pump_runs_a_whole_session() {
        let (server_end, client_end) = InMemoryTransport::pair();
        let mut server: Link<_, ClientMessage, ServerMessage> = Link::new(server_end);
        let mut client = BattleClient::new(
            client_end,
            PuppetController::new(SyncConfig::default(), defs()),
        );
        let mut host = NullHost;
        let mut stage = NullStage;
        let mut gate = GateCell::new(SharedState::new());

        server
            .send(&ServerMessage::BattleStart {
                actors: vec![ActorSetup {
                    index: 0,
                    name: "Alia".into(),
                    hp: 50,
                    max_hp: 80,
                    mp: 20,
                    max_mp: 20,
                    tp: 0,
                    attack_animation: AnimationId::new(1),
                    overrides: Default::default(),
                }],
                enemies: vec![EnemySetup {
                    enemy_id: EnemyId::new(3),
                    hp: 30,
                    max_hp: 30,
                    mp: 0,
                    max_mp: 0,
                }],
            })
            .unwrap();

        {
            let mut io = BattleIo {
                host: &mut host,
                stage: &mut stage,
                gate: &mut gate,
            };
            client.pump(&mut io).unwrap();
        }
        assert!(client.controller().puppet_active());

        server
            .send(&ServerMessage::BattleEnd {
                result: BattleResult::Escape,
                exp: 0,
                gold: 0,
                drops: Vec::new(),
            })
            .unwrap();
        {
            let mut io = BattleIo {
                host: &mut host,
                stage: &mut stage,
                gate: &mut gate,
            };
            client.pump(&mut io).unwrap();
        }
        assert!(!client.controller().puppet_active());

        // The ack was drained onto the wire within the same pump.
        assert_eq!(
            server.poll().unwrap(),
            Some(ClientMessage::BattleResultAck {
                result: BattleResult::Escape
            })
        );
    }
}

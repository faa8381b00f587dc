//! Marionette Core - client-side playback for server-authoritative battles
//!
//! This crate provides the synchronization layer between a battle server
//! and a pre-existing local battle engine:
//! - Session state: the server's roster snapshot and stat overrides
//! - A strict-FIFO event queue and per-tick playback driver
//! - An action animator that applies server outcomes on a timed schedule
//! - An input broker that turns UI choices into outbound messages
//! - A flow switch that suppresses the host's own battle logic ("puppet
//!   mode") while the server drives
//! - A gated interpreter for scripted secondary effects
//!
//! The host engine is reached only through the [`HostBridge`] and
//! [`Stage`] traits; the server only through [`ServerMessage`] and
//! [`ClientMessage`]. The controller never does combat math: damage, AI,
//! and rewards all arrive resolved and are replayed as timed presentation.

mod animator;
mod battler;
mod config;
mod controller;
mod defs;
mod error;
mod event;
mod flow;
mod gate;
mod host;
mod id;
mod input;
mod interpreter;
mod protocol;
mod session;
mod transcript;

#[cfg(test)]
mod testkit;

pub use animator::ActionAnimator;
pub use battler::{
    BattlerRef, Combatant, PartyMember, Side, StatOverride, TroopMember, Vitals, TP_MAX,
};
pub use config::{LayoutConfig, SyncConfig, TimingConfig};
pub use controller::PuppetController;
pub use defs::{ContentDefs, EffectDef, EnemyDef, ItemDef, SkillDef, StateDef, TargetScope};
pub use error::{Error, Result};
pub use event::{
    ActionEvent, BattleResult, CombatEvent, DropAward, ItemKind, RegenOutcome, RewardBundle,
    TargetOutcome, TurnEndEvent,
};
pub use flow::{BattleFlow, LocalFlow, PuppetFlow};
pub use gate::{GateCell, GateGuard, SharedState};
pub use host::{Backdrop, BattleIo, HostBridge, Stage};
pub use id::{AnimationId, EffectId, EnemyId, ItemId, SkillId, StateId, ATTACK_SKILL};
pub use input::{CommandChoice, InputBroker, PendingInput};
pub use interpreter::{Interpreter, ScriptCommand, ScriptCtx, ScriptError, VarOp};
pub use protocol::{ActionType, ActorSetup, ClientMessage, EnemySetup, ServerMessage};
pub use session::BattleSession;
pub use transcript::{Direction, Transcript, TranscriptEntry};

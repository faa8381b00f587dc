//! Marionette Net - wire plumbing for the battle client
//!
//! This crate turns any at-least-once byte transport into the
//! exactly-once, in-order message stream the playback core expects:
//! - A [`Transport`] trait users implement for their network stack
//! - Sequenced [`Envelope`] framing with duplicate drop
//! - A typed bincode [`Link`] that skips malformed frames
//! - The [`BattleClient`] pump the host runs once per render tick

mod client;
mod envelope;
mod error;
mod link;
mod transport;

pub use client::BattleClient;
pub use envelope::{Envelope, SeqGate};
pub use error::{Error, Result};
pub use link::Link;
pub use transport::{InMemoryTransport, Transport};

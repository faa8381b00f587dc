//! Sequenced envelopes over an at-least-once transport
//!
//! The queue contract upstairs is exactly-once in order; the transport
//! contract is at-least-once. The gap is closed here: every outbound
//! frame carries a monotonic sequence number, and inbound frames at or
//! below the last accepted number are dropped as duplicates.

use serde::{Deserialize, Serialize};

/// One framed message with its sequence number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub seq: u64,
    pub body: T,
}

/// Serialize-only view so sending never clones the body
#[derive(Serialize)]
pub(crate) struct EnvelopeRef<'a, T> {
    pub seq: u64,
    pub body: &'a T,
}

/// Sequence bookkeeping for one peer
#[derive(Debug, Default)]
pub struct SeqGate {
    next_outbound: u64,
    last_accepted: u64,
}

impl SeqGate {
    /// Create a gate with no traffic seen
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next outbound sequence number
    pub fn stamp(&mut self) -> u64 {
        self.next_outbound += 1;
        self.next_outbound
    }

    /// Decide whether an inbound sequence number is new
    ///
    /// Accepts anything above the highest number seen so far; gaps are
    /// fine (the transport may have retried an earlier frame already).
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.last_accepted {
            return false;
        }
        self.last_accepted = seq;
        true
    }

    /// Highest inbound sequence number accepted so far
    pub fn last_accepted(&self) -> u64 {
        self.last_accepted
    }
}

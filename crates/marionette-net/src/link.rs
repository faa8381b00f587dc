//! Typed message link over a raw transport
//!
//! Frames messages with bincode inside sequenced envelopes. Malformed
//! frames are logged and skipped so one bad payload never kills the
//! session; duplicated frames are dropped by the sequence gate.

use crate::envelope::{Envelope, EnvelopeRef, SeqGate};
use crate::error::Result;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Bidirectional typed link: receives `In`, sends `Out`
pub struct Link<T, In, Out> {
    transport: T,
    gate: SeqGate,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<T, In, Out> Link<T, In, Out>
where
    T: Transport,
    In: DeserializeOwned,
    Out: Serialize,
{
    /// Wrap a transport in a typed link
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            gate: SeqGate::new(),
            _marker: PhantomData,
        }
    }

    /// Encode and send one message
    pub fn send(&mut self, message: &Out) -> Result<()> {
        let envelope = EnvelopeRef {
            seq: self.gate.stamp(),
            body: message,
        };
        let bytes = bincode::serialize(&envelope)?;
        self.transport.send(&bytes)
    }

    /// Receive the next fresh message, if any (non-blocking)
    ///
    /// Skips duplicates and undecodable frames instead of failing; only
    /// transport errors propagate.
    pub fn poll(&mut self) -> Result<Option<In>> {
        while let Some(bytes) = self.transport.recv()? {
            match bincode::deserialize::<Envelope<In>>(&bytes) {
                Ok(envelope) => {
                    if self.gate.accept(envelope.seq) {
                        return Ok(Some(envelope.body));
                    }
                    debug!(seq = envelope.seq, "duplicate frame dropped");
                }
                Err(e) => {
                    warn!(error = %e, len = bytes.len(), "malformed frame skipped");
                }
            }
        }
        Ok(None)
    }

    /// The wrapped transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryTransport;
    use marionette_core::{ClientMessage, ServerMessage};

    type ServerLink = Link<InMemoryTransport, ClientMessage, ServerMessage>;
    type ClientLink = Link<InMemoryTransport, ServerMessage, ClientMessage>;

    fn pair() -> (ServerLink, ClientLink) {
        let (a, b) = InMemoryTransport::pair();
        (Link::new(a), Link::new(b))
    }

    #[test]
    fn test_typed_roundtrip() {
        let (mut server, mut client) = pair();
        server
            .send(&ServerMessage::BattleInputRequest { actor_index: 2 })
            .unwrap();
        assert_eq!(
            client.poll().unwrap(),
            Some(ServerMessage::BattleInputRequest { actor_index: 2 })
        );
        assert_eq!(client.poll().unwrap(), None);
    }

    #[test]
    fn test_duplicate_frame_dropped() {
        let (mut server, mut client) = pair();
        // Re-send the same envelope bytes, simulating a transport retry.
        let envelope = EnvelopeRef {
            seq: 1,
            body: &ServerMessage::BattleTurnStart {},
        };
        let bytes = bincode::serialize(&envelope).unwrap();
        server.transport_mut().send(&bytes).unwrap();
        server.transport_mut().send(&bytes).unwrap();

        assert_eq!(
            client.poll().unwrap(),
            Some(ServerMessage::BattleTurnStart {})
        );
        assert_eq!(client.poll().unwrap(), None);
    }

    #[test]
    fn test_malformed_frame_skipped() {
        let (mut server, mut client) = pair();
        server.transport_mut().send(&[0xff, 0x01, 0x02]).unwrap();
        server
            .send(&ServerMessage::BattleTurnStart {})
            .unwrap();
        // The garbage frame is skipped, the real one still arrives.
        assert_eq!(
            client.poll().unwrap(),
            Some(ServerMessage::BattleTurnStart {})
        );
    }
}

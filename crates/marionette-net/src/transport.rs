//! Transport seam toward the real network stack
//!
//! The library never opens sockets. Users implement [`Transport`] for
//! their chosen stack (TCP, WebSocket, whatever the host engine already
//! carries); the in-memory pair exists for tests and single-process demos.
//! Delivery is assumed at-least-once; the link layer above deduplicates.

use crate::error::{Error, Result};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

/// One framed, bidirectional byte pipe
pub trait Transport {
    /// Send one frame
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive one frame (non-blocking)
    ///
    /// Returns `Ok(None)` when no frame is waiting.
    fn recv(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Channel-backed transport for tests and demos
pub struct InMemoryTransport {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl InMemoryTransport {
    /// Create two connected endpoints
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = channel();
        let (b_tx, a_rx) = channel();
        (
            Self { tx: a_tx, rx: a_rx },
            Self { tx: b_tx, rx: b_rx },
        )
    }
}

impl Transport for InMemoryTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.tx
            .send(data.to_vec())
            .map_err(|_| Error::Disconnected)
    }

    fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        match self.rx.try_recv() {
            Ok(data) => Ok(Some(data)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_roundtrip() {
        let (mut a, mut b) = InMemoryTransport::pair();
        a.send(b"hello").unwrap();
        assert_eq!(b.recv().unwrap(), Some(b"hello".to_vec()));
        assert_eq!(b.recv().unwrap(), None);

        b.send(b"world").unwrap();
        assert_eq!(a.recv().unwrap(), Some(b"world".to_vec()));
    }

    #[test]
    fn test_disconnected_peer_is_an_error() {
        let (mut a, b) = InMemoryTransport::pair();
        drop(b);
        assert!(a.send(b"x").is_err());
        assert!(matches!(a.recv(), Err(Error::Disconnected)));
    }
}

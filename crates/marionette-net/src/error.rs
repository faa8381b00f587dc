//! Error types for marionette-net

use thiserror::Error;

/// Network layer error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Peer disconnected")]
    Disconnected,

    #[error("Wire codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

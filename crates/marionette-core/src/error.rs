//! Error types for marionette-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("No battle session is active")]
    NoSession,

    #[error("Battler not found: {0}")]
    BattlerNotFound(String),

    #[error("Definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("Invalid message field: {0}")]
    InvalidField(String),

    #[error("Transcript export failed: {0}")]
    Export(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

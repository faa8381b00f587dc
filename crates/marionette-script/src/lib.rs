//! Marionette Script - RON loaders for battle content
//!
//! Loads the client-side content mirror from RON files:
//! - Skill, item, enemy, and state definitions
//! - Secondary-effect command blocks
//! - The synchronization layer's [`SyncConfig`]
//!
//! [`SyncConfig`]: marionette_core::SyncConfig

mod error;
mod loader;

pub use error::{Error, Result};
pub use loader::{load_config, Loader};

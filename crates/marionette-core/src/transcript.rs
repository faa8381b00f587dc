//! Battle transcript for post-mortem debugging
//!
//! An in-memory, tick-stamped record of everything that crossed the wire
//! plus session milestones. Diagnostics only: the library never writes it
//! anywhere, it just hands the host a RON string on request.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which way an entry flowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Server to client
    Inbound,
    /// Client to server
    Outbound,
    /// Local milestone (session start, timeout, and so on)
    Note,
}

/// One transcript line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Controller tick when the entry was recorded
    pub tick: u64,
    pub direction: Direction,
    pub summary: String,
}

/// Append-only record of one or more battles
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line
    pub fn record(&mut self, tick: u64, direction: Direction, summary: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            tick,
            direction,
            summary: summary.into(),
        });
    }

    /// Number of recorded lines
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over recorded lines in order
    pub fn entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    /// Drop every recorded line
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render the whole transcript as pretty RON
    pub fn export_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Export(e.to_string()))
    }
}

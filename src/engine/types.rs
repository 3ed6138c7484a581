//! Engine types
//!
//! Statistics for a collection run.

use serde::Serialize;
use std::fmt;

/// Statistics from a collection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Items produced by discovery
    pub items_discovered: usize,
    /// Items whose collect request got a response
    pub items_collected: usize,
    /// Body bytes written
    pub bytes_written: u64,
    /// Errors reported to the job
    pub errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collected item and its body size
    pub fn add_collected(&mut self, bytes: usize) {
        self.items_collected += 1;
        self.bytes_written += bytes as u64;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// Whether every discovered item was collected without errors
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.items_collected == self.items_discovered
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "discovered={} collected={} bytes={} errors={} duration={}ms",
            self.items_discovered,
            self.items_collected,
            self.bytes_written,
            self.errors,
            self.duration_ms
        )
    }
}

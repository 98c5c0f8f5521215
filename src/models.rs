//! Data models module
//!
//! Defines core data structures:
//! - LogRecord: One appended line of the destination size log
//! - SchedulerState: Lifecycle state of the work loop
//! - Takeover: Outcome of claiming the PID file

use chrono::{DateTime, Local};
use std::fmt;

use crate::constants::RECORD_TIME_FORMAT;

/// A single entry of `size.log`, written once per work cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Local time at which the measurement finished
    pub timestamp: DateTime<Local>,
    /// Total size of the regular files found under the source directory
    pub measured_bytes: u64,
}

impl LogRecord {
    /// Create a record stamped with the current local time
    pub fn now(measured_bytes: u64) -> Self {
        Self {
            timestamp: Local::now(),
            measured_bytes,
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time: {}, Size: {} bytes",
            self.timestamp.format(RECORD_TIME_FORMAT),
            self.measured_bytes
        )
    }
}

/// States of the scheduler loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Stopping,
}

/// What the instance guard found in the PID file before claiming it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Takeover {
    /// No PID file existed (or it could not be read)
    Fresh,
    /// The file did not contain a usable process identifier
    Unparseable,
    /// The recorded process was no longer running
    Stale(i32),
    /// The recorded process was alive and has been sent SIGTERM
    Evicted(i32),
}

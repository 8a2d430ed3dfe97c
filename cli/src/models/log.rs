//! Log entry models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which remote stream a log entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Build,
    Runtime,
}

impl std::fmt::Display for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogSource::Build => f.write_str("build"),
            LogSource::Runtime => f.write_str("runtime"),
        }
    }
}

/// A single application log entry
///
/// Entries are append-only; the sequence token is monotonic per
/// application and is the sole basis for ordering, deduplication and
/// stream resumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence token
    pub token: u64,

    /// When the entry was produced
    pub timestamp: DateTime<Utc>,

    /// Source stream
    pub source: LogSource,

    /// Message text
    pub message: String,
}

//! Run Identity - names the run log file

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp layout used by [`RunIdentity::now`].
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// (prefix, timestamp) pair naming a run's log file.
///
/// Fixed before the log file is opened and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    prefix: String,
    timestamp: String,
}

impl RunIdentity {
    /// Create an identity from an explicit prefix and timestamp.
    #[must_use]
    pub fn new(prefix: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Create an identity stamped with the current local time.
    #[must_use]
    pub fn now(prefix: impl Into<String>) -> Self {
        Self::new(prefix, Local::now().format(TIMESTAMP_FORMAT).to_string())
    }

    /// Get the prefix (e.g. `train` or `test`).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the timestamp.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// File name of the run log: `{prefix}_{timestamp}.log`.
    #[must_use]
    pub fn log_file_name(&self) -> String {
        format!("{}_{}.log", self.prefix, self.timestamp)
    }
}

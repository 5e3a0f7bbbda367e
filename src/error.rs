//! Error types for trainer-hooks
//!
//! Hooks perform no recovery: every failure surfaces to the host and aborts the run.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trainer-hooks error types
#[derive(Error, Debug)]
pub enum Error {
    /// Results or checkpoint directory could not be created
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was being created
        path: PathBuf,
        /// Underlying platform error
        #[source]
        source: std::io::Error,
    },

    /// Best checkpoint could not be copied to its stable name
    #[error("failed to copy best checkpoint {} -> {}: {source}", from.display(), to.display())]
    Copy {
        /// Checkpoint reported as best by the host
        from: PathBuf,
        /// Stable `best.ckpt` target
        to: PathBuf,
        /// Underlying platform error
        #[source]
        source: std::io::Error,
    },

    /// Run configuration did not serialize to a JSON object
    #[error("run configuration must be a JSON object, got {0}")]
    NotAnObject(String),

    /// A registered callback failed while handling a lifecycle event
    #[error("callback '{name}' failed: {source}")]
    Callback {
        /// Name reported by the failing callback
        name: String,
        /// Error raised by the callback
        #[source]
        source: Box<Error>,
    },

    /// Run log file could not be opened
    #[error("failed to open run log: {0}")]
    LogInit(#[from] tracing_appender::rolling::InitError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

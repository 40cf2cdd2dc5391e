//! Error types for the harness
//!
//! Only faults that abort the whole run live here. Per-test problems
//! (non-zero exit, timeouts, token mismatches) are reported as verdict
//! messages and never become a `HarnessError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to spawn runner {runner}: {source}")]
    Spawn {
        runner: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

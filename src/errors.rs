//! Typed error definitions for reorg_move.
//! Per-entry failures are recoverable and keep the entry for the next run;
//! only `Config` is fatal, and it is raised before any batch work starts.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReorgError {
    #[error("Source path not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Refusing to move {path}: {reason}")]
    UnsafeMove { path: PathBuf, reason: String },

    #[error("{op} '{path}': {source}{hint}")]
    Io {
        op: &'static str,
        path: PathBuf,
        hint: String,
        #[source]
        source: io::Error,
    },

    #[error("Ticket '{title}' was not created: {reason}")]
    NotificationFailed { title: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReorgError {
    /// Stable numeric code for structured log fields.
    pub fn code(&self) -> i32 {
        match self {
            ReorgError::SourceNotFound(_) => 10,
            ReorgError::DestinationExists(_) => 11,
            ReorgError::UnsafeMove { .. } => 12,
            ReorgError::Io { .. } => 20,
            ReorgError::NotificationFailed { .. } => 30,
            ReorgError::Config(_) => 40,
        }
    }

    /// True for the two expected skip conditions of a move.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            ReorgError::SourceNotFound(_) | ReorgError::DestinationExists(_)
        )
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ReorgError::Config(msg.into())
    }

    pub fn unsafe_move(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ReorgError::UnsafeMove {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

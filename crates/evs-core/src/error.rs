//! Error taxonomy for the search pipeline.
//!
//! Per-file ([`DecodeError::Open`]) and per-record ([`DecodeError::Record`])
//! failures are recovered inside the engine. Only [`SearchError`] escapes a
//! search, and only [`SearchError::ListDirectory`] is ever shown to a user.

use std::path::PathBuf;

/// Failure reported by a [`RecordDecoder`](crate::RecordDecoder).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file is unreadable or not a valid log container.
    #[error("cannot open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    /// A single record is malformed. The stream continues after it.
    #[error("malformed record: {0}")]
    Record(String),
}

impl DecodeError {
    pub fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn record(reason: impl ToString) -> Self {
        Self::Record(reason.to_string())
    }
}

/// Failure that ends a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("cannot list directory {}: {source}", path.display())]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Superseded or cancelled by the controller. Never shown to users.
    #[error("search cancelled")]
    Cancelled,
}

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("search.limit must be greater than 0")]
    ZeroLimit,

    #[error("invalid file pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("unknown decoder {0:?} (expected \"evtx\" or \"jsonl\")")]
    UnknownDecoder(String),

    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

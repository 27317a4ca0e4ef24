use std::path::PathBuf;

use thiserror::Error;

/// Errors from the statistics store
#[derive(Debug, Error)]
pub enum StatsError {
    /// Caller passed an unusable identifier; never persisted
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stats file exists but cannot be read as a record
    #[error("malformed record {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl StatsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StatsError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StatsError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

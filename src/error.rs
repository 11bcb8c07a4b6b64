use std::path::PathBuf;
use thiserror::Error;

/// Failure of the durable store backing tasks or definitions.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {}{}: {source}", path.display(), line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Malformed {
        path: PathBuf,
        line: Option<usize>,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Caller's fault; nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("task {0} not found")]
    NotFound(u64),

    /// Transient storage failure. The caller owns the retry policy.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The task exists but its definition could not be recorded.
    #[error("failed to append recurring definition: {0}")]
    DefinitionAppendFailed(#[source] StoreError),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

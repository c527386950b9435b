//! Crate-wide error type.
//!
//! Every public operation returns `Result<T, Error>`. Internally, modules
//! compose with `anyhow::Result` the way the teacher's `crawl_engine` does,
//! converting to a typed `Error` only at the boundary a caller sees.

use thiserror::Error;

/// Result alias used across the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied parameter failed validation (out-of-range config,
    /// malformed URL, empty query, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced job, partition file, or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requested transition conflicts with the current state (e.g.
    /// pausing a job that already finished).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else: local I/O, serialization, or network failures that
    /// escaped the module boundaries meant to absorb them.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(format!("{err:#}"))
    }
}

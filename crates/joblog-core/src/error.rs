//! Error types for joblog.

use joblog_types::KeyParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JoblogError {
    #[error("Could not load logs: no upstream context for {owner}/{repo}")]
    NoContext { owner: String, repo: String },

    #[error("Invalid log key: {0}")]
    InvalidKey(#[from] KeyParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure reported by a [`LogSource`](crate::LogSource) fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The log artifact expired or no longer exists upstream.
    #[error("Log is gone")]
    Gone,

    #[error("{0}")]
    Failed(String),
}

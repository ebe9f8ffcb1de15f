//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by an external collaborator (source host or analysis service).
///
/// Remote calls are atomic: they either produce a value or one of these.
/// Nothing in the crate retries them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote service unavailable: {0}")]
    Unavailable(String),

    #[error("Remote service returned an empty response: {0}")]
    EmptyResponse(String),

    #[error("Remote service returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by session-level operations
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(String),

    #[error("No repository loaded")]
    NoRepository,

    #[error("Path not found in repository tree: {0}")]
    PathNotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("File is not open: {0}")]
    FileNotOpen(String),

    #[error("File has not been analyzed yet: {0}")]
    NotAnalyzed(String),

    #[error("Remote failure: {0}")]
    RemoteFailure(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to read {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

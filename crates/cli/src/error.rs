//! Error types for CLI operations.

use contracts::PublishError;
use fetch::FetchError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// A line of the dispatch input could not be decoded
    #[error("Invalid dispatch on line {line}: {message}")]
    InvalidDispatch { line: usize, message: String },

    /// Writer refused or failed a publish
    #[error("Publish failed: {0}")]
    Publish(#[from] PublishError),

    /// Document fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_dispatch(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidDispatch {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

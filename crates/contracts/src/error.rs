//! Layered error definitions
//!
//! Categorized by source: config / publish / transport

use thiserror::Error;

/// Configuration and general error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Message Errors =====
    /// Routing key rejected when parsed
    #[error("invalid destination '{value}': {reason}")]
    InvalidDestination { value: String, reason: &'static str },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error reported by a [`Channel`](crate::Channel) when a publish fails
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Create a transport error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error wrapping an underlying cause
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Error message as reported by the channel
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors returned to callers of the channel writer
#[derive(Debug, Error)]
pub enum PublishError {
    /// No live channel could be obtained: the controller had none to give,
    /// or the writer is closed.
    #[error("Unable to obtain a connection and channel to the broker.")]
    ChannelUnavailable,

    /// Channel known to be degraded.
    ///
    /// Reserved: no code path raises this yet.
    #[error("The message cannot be published, the channel is unstable.")]
    ChannelUnstable,

    /// Publish failure reported by the channel, returned unchanged
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl PublishError {
    /// Whether a later write may succeed once a fresh channel is acquired
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

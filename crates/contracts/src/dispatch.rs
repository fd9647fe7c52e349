//! Dispatch and WireMessage
//!
//! `Dispatch` is what application code hands to a writer. `WireMessage` is the
//! publish-ready form a [`Channel`](crate::Channel) receives, stamped with the
//! time of translation.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Destination;

/// Application-level message before wire translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    /// Routing key the message is published to
    pub destination: Destination,

    /// Opaque message body
    pub payload: Bytes,

    /// Application message type (e.g., "order.created")
    #[serde(default)]
    pub message_type: Option<String>,

    /// MIME type of the payload
    #[serde(default)]
    pub content_type: Option<String>,

    /// Encoding of the payload (e.g., "gzip")
    #[serde(default)]
    pub content_encoding: Option<String>,

    /// Application-assigned message identifier
    #[serde(default)]
    pub message_id: Option<String>,

    /// Correlation identifier for request/reply flows
    #[serde(default)]
    pub correlation_id: Option<String>,

    /// Whether the broker should persist the message
    #[serde(default = "default_durable")]
    pub durable: bool,

    /// Time-to-live on the broker
    #[serde(default)]
    pub expiration: Option<Duration>,
}

fn default_durable() -> bool {
    true
}

impl Dispatch {
    /// Create a durable dispatch with no metadata
    pub fn new(destination: impl Into<Destination>, payload: impl Into<Bytes>) -> Self {
        Self {
            destination: destination.into(),
            payload: payload.into(),
            message_type: None,
            content_type: None,
            content_encoding: None,
            message_id: None,
            correlation_id: None,
            durable: default_durable(),
            expiration: None,
        }
    }

    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_content_encoding(mut self, content_encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(content_encoding.into());
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

/// Broker delivery mode (AMQP numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Kept in memory only
    Transient = 1,
    /// Written to disk by the broker
    #[default]
    Persistent = 2,
}

/// Publish-ready message handed to a channel
#[derive(Debug, Clone, PartialEq)]
pub struct WireMessage {
    /// Moment the dispatch was translated
    pub timestamp: DateTime<Utc>,
    pub delivery_mode: DeliveryMode,
    pub message_type: Option<String>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub message_id: Option<String>,
    pub correlation_id: Option<String>,
    /// Time-to-live in whole milliseconds, as the broker expects it
    pub expiration: Option<String>,
    pub body: Bytes,
}

//! Dispatch -> WireMessage translation

use chrono::{DateTime, Utc};
use contracts::{DeliveryMode, Dispatch, WireMessage};

/// Translate a dispatch into its publish-ready form
///
/// Pure: the only input besides the dispatch is the caller-supplied `now`.
pub fn to_wire(dispatch: &Dispatch, now: DateTime<Utc>) -> WireMessage {
    let delivery_mode = if dispatch.durable {
        DeliveryMode::Persistent
    } else {
        DeliveryMode::Transient
    };

    WireMessage {
        timestamp: now,
        delivery_mode,
        message_type: dispatch.message_type.clone(),
        content_type: dispatch.content_type.clone(),
        content_encoding: dispatch.content_encoding.clone(),
        message_id: dispatch.message_id.clone(),
        correlation_id: dispatch.correlation_id.clone(),
        expiration: dispatch
            .expiration
            .map(|ttl| ttl.as_millis().to_string()),
        body: dispatch.payload.clone(),
    }
}

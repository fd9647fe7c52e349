//! Broker capability traits
//!
//! A [`Controller`] hides connection pooling and retry; it only knows how to
//! hand out a ready [`Channel`]. Production implementations live with the
//! broker client, the writer only depends on these two traits.

use std::future::Future;

use crate::{Destination, TransportError, WireMessage};

/// One open logical conduit to the broker
///
/// `publish` takes `&self`: a writer shares its channel between concurrent
/// callers, so implementations must tolerate concurrent publishes.
pub trait Channel: Send + Sync {
    /// Publish a translated message to `destination`
    ///
    /// # Errors
    /// Returns the transport failure. The caller discards the channel.
    fn publish(
        &self,
        destination: &Destination,
        message: WireMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Release the underlying resources
    ///
    /// Idempotent: closing twice is a no-op.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Producer of live channels
pub trait Controller: Send + Sync {
    type Channel: Channel + 'static;

    /// Open a new channel
    ///
    /// Returns `None` when no channel can be acquired right now (no
    /// connection, pool exhausted). Safe to call repeatedly and concurrently.
    fn open_channel(&self) -> impl Future<Output = Option<Self::Channel>> + Send;
}

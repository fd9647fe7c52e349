//! Loopback controller
//!
//! In-process broker double: every channel it opens appends successful
//! publishes to a shared journal. Supports injecting unavailability and
//! publish failures.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{Channel, Controller, Destination, TransportError, WireMessage};
use parking_lot::Mutex;
use tracing::{debug, instrument};

/// A message accepted by a loopback channel
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    /// Channel that accepted the publish
    pub channel_id: u64,
    pub destination: Destination,
    pub message: WireMessage,
}

#[derive(Debug)]
struct LoopbackState {
    /// Whether `open_channel` hands out channels
    available: AtomicBool,
    /// Publishes still to be failed, regardless of channel
    fail_next: AtomicU64,
    /// Fail every Nth publish attempt (0 = never)
    fail_every: u64,
    publish_seq: AtomicU64,
    next_channel_id: AtomicU64,
    opened: AtomicU64,
    closed: AtomicU64,
    journal: Mutex<Vec<PublishedMessage>>,
}

/// Controller handing out [`LoopbackChannel`]s
///
/// Clones share the same journal and failure settings.
#[derive(Debug, Clone)]
pub struct LoopbackController {
    state: Arc<LoopbackState>,
}

impl LoopbackController {
    /// Create an available controller that never fails
    pub fn new() -> Self {
        Self::with_fail_every(0)
    }

    /// Create a controller whose channels fail every `n`th publish
    pub fn with_fail_every(n: u64) -> Self {
        Self {
            state: Arc::new(LoopbackState {
                available: AtomicBool::new(true),
                fail_next: AtomicU64::new(0),
                fail_every: n,
                publish_seq: AtomicU64::new(0),
                next_channel_id: AtomicU64::new(1),
                opened: AtomicU64::new(0),
                closed: AtomicU64::new(0),
                journal: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Toggle whether `open_channel` returns a channel
    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    /// Fail the next `n` publishes on any channel
    pub fn fail_next_publishes(&self, n: u64) {
        self.state.fail_next.store(n, Ordering::SeqCst);
    }

    /// Number of channels handed out
    pub fn channels_opened(&self) -> u64 {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Number of channels closed
    pub fn channels_closed(&self) -> u64 {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Copy of every accepted publish, in acceptance order
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state.journal.lock().clone()
    }

    pub fn published_count(&self) -> usize {
        self.state.journal.lock().len()
    }
}

impl Default for LoopbackController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for LoopbackController {
    type Channel = LoopbackChannel;

    #[instrument(name = "loopback_open_channel", skip(self))]
    async fn open_channel(&self) -> Option<LoopbackChannel> {
        if !self.state.available.load(Ordering::SeqCst) {
            debug!("Loopback broker unavailable");
            return None;
        }

        let id = self.state.next_channel_id.fetch_add(1, Ordering::SeqCst);
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        debug!(channel_id = id, "Loopback channel opened");

        Some(LoopbackChannel {
            id,
            closed: AtomicBool::new(false),
            state: Arc::clone(&self.state),
        })
    }
}

/// Channel backed by the loopback journal
#[derive(Debug)]
pub struct LoopbackChannel {
    id: u64,
    closed: AtomicBool,
    state: Arc<LoopbackState>,
}

impl LoopbackChannel {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn should_fail(&self, seq: u64) -> bool {
        let injected = self
            .state
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        injected || (self.state.fail_every > 0 && seq % self.state.fail_every == 0)
    }
}

impl Channel for LoopbackChannel {
    async fn publish(
        &self,
        destination: &Destination,
        message: WireMessage,
    ) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::new(format!(
                "loopback channel {} is closed",
                self.id
            )));
        }

        let seq = self.state.publish_seq.fetch_add(1, Ordering::SeqCst) + 1;
        if self.should_fail(seq) {
            return Err(TransportError::new(format!(
                "loopback channel {} rejected publish #{}",
                self.id, seq
            )));
        }

        self.state.journal.lock().push(PublishedMessage {
            channel_id: self.id,
            destination: destination.clone(),
            message,
        });
        Ok(())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.closed.fetch_add(1, Ordering::SeqCst);
            debug!(channel_id = self.id, "Loopback channel closed");
        }
    }
}

//! ChannelWriter - resilient publisher over a lazily acquired channel
//!
//! The writer owns at most one live channel. It asks the controller for one on
//! first use, keeps it while publishes succeed, and drops it on the first
//! failure so the next write acquires a fresh one. Retrying is the caller's
//! job.
//!
//! ## Locking
//!
//! Two pieces of shared state:
//! - `lifecycle` (async mutex): the `Open -> Closed` state machine. Channel
//!   acquisition runs while holding it, so no channel is ever stored after
//!   `close` returns.
//! - `channel` (sync `RwLock`): the slot holding the current channel. Held
//!   only for a pointer read or write, never across an `.await`.
//!
//! Writes take a fast path that reads `closed` and the slot without the
//! lifecycle lock. This is a relaxed read: it may see a channel another task is
//! about to discard (that publish fails too and is reported to its caller) or
//! miss one just stored (the locked path re-checks the slot before calling the
//! controller). It can never observe a half-built channel, since a channel is
//! wrapped in an `Arc` before it is stored.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use contracts::{Channel, Clock, Controller, Dispatch, PublishError, SystemClock};
use observability::metrics::{self as obs, WriteOutcome};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::metrics::WriterMetrics;
use crate::translate::to_wire;

/// Writer lifecycle. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Open,
    Closed,
}

/// Publisher that hides channel failures behind a stable write contract
pub struct ChannelWriter<C: Controller> {
    name: String,
    controller: C,
    clock: Arc<dyn Clock>,
    transactional: bool,
    /// Suppress publishing until the next commit boundary.
    ///
    /// Reserved for transactional support; no transition reads or sets it.
    skip_until_commit: bool,
    lifecycle: Mutex<Lifecycle>,
    /// Mirror of `lifecycle == Closed` for the lock-free fast path
    closed: AtomicBool,
    channel: RwLock<Option<Arc<C::Channel>>>,
    metrics: Arc<WriterMetrics>,
}

impl<C: Controller> ChannelWriter<C> {
    /// Create a writer reading the system clock
    pub fn new(controller: C, transactional: bool) -> Self {
        Self::with_clock(controller, transactional, Arc::new(SystemClock))
    }

    /// Create a writer stamping messages from `clock`
    pub fn with_clock(controller: C, transactional: bool, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: "default".to_string(),
            controller,
            clock,
            transactional,
            skip_until_commit: false,
            lifecycle: Mutex::new(Lifecycle::Open),
            closed: AtomicBool::new(false),
            channel: RwLock::new(None),
            metrics: Arc::new(WriterMetrics::new()),
        }
    }

    /// Set the name used in logs and metric labels
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_transactional(&self) -> bool {
        self.transactional
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Whether a channel is currently held
    pub fn holds_channel(&self) -> bool {
        self.channel.read().is_some()
    }

    pub fn metrics(&self) -> &Arc<WriterMetrics> {
        &self.metrics
    }

    /// Access to the controller (mostly for inspection in tests and tools)
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Publish one dispatch
    ///
    /// Never retries. On a publish failure the channel is closed and dropped
    /// before the error is returned, so the next write acquires a new one.
    ///
    /// # Errors
    /// - `ChannelUnavailable` when no channel can be obtained or the writer is
    ///   closed; nothing is published
    /// - `Transport` carrying the channel's error unchanged
    #[instrument(
        name = "channel_writer_write",
        skip(self, dispatch),
        fields(writer = %self.name, destination = %dispatch.destination)
    )]
    pub async fn write(&self, dispatch: &Dispatch) -> Result<(), PublishError> {
        let Some(channel) = self.ensure_channel().await else {
            self.metrics.inc_unavailable_count();
            obs::record_write(&self.name, WriteOutcome::Unavailable);
            debug!(closed = self.is_closed(), "No channel available");
            return Err(PublishError::ChannelUnavailable);
        };

        let message = to_wire(dispatch, self.clock.now());
        let started = Instant::now();
        let result = channel.publish(&dispatch.destination, message).await;
        obs::record_publish_latency_ms(&self.name, started.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(()) => {
                self.metrics.inc_write_count();
                obs::record_write(&self.name, WriteOutcome::Success);
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                obs::record_write(&self.name, WriteOutcome::Failure);
                warn!(error = %e, "Publish failed, discarding channel");
                self.discard(&channel).await;
                Err(PublishError::Transport(e))
            }
        }
    }

    /// Commit the current transaction
    ///
    /// No broker interaction: always succeeds, transactional or not.
    #[instrument(name = "channel_writer_commit", skip(self), fields(writer = %self.name))]
    pub async fn commit(&self) -> Result<(), PublishError> {
        debug!(
            transactional = self.transactional,
            skip_until_commit = self.skip_until_commit,
            "Commit requested"
        );
        Ok(())
    }

    /// Close the writer for good
    ///
    /// Idempotent. A currently held channel is left alone; it is only closed
    /// reactively on a failed publish or by the controller's own teardown.
    /// Writes already past channel acquisition still publish.
    #[instrument(name = "channel_writer_close", skip(self), fields(writer = %self.name))]
    pub async fn close(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if *lifecycle == Lifecycle::Closed {
            debug!("Writer already closed");
            return;
        }

        *lifecycle = Lifecycle::Closed;
        self.closed.store(true, Ordering::Release);
        info!(holds_channel = self.holds_channel(), "Channel writer closed");
    }

    /// Return the held channel, acquiring one if needed
    async fn ensure_channel(&self) -> Option<Arc<C::Channel>> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        let held = self.channel.read().clone();
        if held.is_some() {
            return held;
        }

        let lifecycle = self.lifecycle.lock().await;
        if *lifecycle == Lifecycle::Closed {
            return None;
        }
        // Another task may have stored a channel while we waited for the lock
        let held = self.channel.read().clone();
        if held.is_some() {
            return held;
        }

        match self.controller.open_channel().await {
            Some(channel) => {
                let channel = Arc::new(channel);
                *self.channel.write() = Some(Arc::clone(&channel));
                self.metrics.inc_acquired_count();
                obs::record_channel_acquired(&self.name);
                debug!("Channel acquired");
                Some(channel)
            }
            None => {
                warn!("Controller could not provide a channel");
                None
            }
        }
    }

    /// Drop `failed` from the slot and close it
    ///
    /// The slot is only cleared if it still holds `failed`: a concurrent write
    /// may already have replaced it with a healthy channel.
    async fn discard(&self, failed: &Arc<C::Channel>) {
        {
            let mut slot = self.channel.write();
            if slot.as_ref().is_some_and(|held| Arc::ptr_eq(held, failed)) {
                *slot = None;
            }
        }
        failed.close().await;
        self.metrics.inc_discarded_count();
        obs::record_channel_discarded(&self.name);
    }
}

impl<C: Controller> fmt::Debug for ChannelWriter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelWriter")
            .field("name", &self.name)
            .field("transactional", &self.transactional)
            .field("closed", &self.is_closed())
            .field("holds_channel", &self.holds_channel())
            .finish()
    }
}

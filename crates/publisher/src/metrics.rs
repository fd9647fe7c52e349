//! Writer metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single channel writer
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Total successful publishes
    write_count: AtomicU64,
    /// Total publishes rejected by a channel
    failure_count: AtomicU64,
    /// Total writes refused because no channel could be obtained
    unavailable_count: AtomicU64,
    /// Channels handed out by the controller
    acquired_count: AtomicU64,
    /// Channels closed and dropped after a failed publish
    discarded_count: AtomicU64,
}

impl WriterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unavailable_count(&self) -> u64 {
        self.unavailable_count.load(Ordering::Relaxed)
    }

    pub fn inc_unavailable_count(&self) {
        self.unavailable_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn acquired_count(&self) -> u64 {
        self.acquired_count.load(Ordering::Relaxed)
    }

    pub fn inc_acquired_count(&self) {
        self.acquired_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn discarded_count(&self) -> u64 {
        self.discarded_count.load(Ordering::Relaxed)
    }

    pub fn inc_discarded_count(&self) {
        self.discarded_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            unavailable_count: self.unavailable_count(),
            acquired_count: self.acquired_count(),
            discarded_count: self.discarded_count(),
        }
    }
}

/// Snapshot of writer metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
    pub unavailable_count: u64,
    pub acquired_count: u64,
    pub discarded_count: u64,
}

impl MetricsSnapshot {
    /// Writes attempted, whatever their outcome
    pub fn attempted(&self) -> u64 {
        self.write_count + self.failure_count + self.unavailable_count
    }
}

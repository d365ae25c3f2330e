//! Channel metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single channel pipeline
#[derive(Debug, Default)]
pub struct ChannelMetrics {
    /// Tasks accepted by the task queue
    submitted: AtomicU64,
    /// Tasks dropped because the task queue was full
    dropped: AtomicU64,
    /// Tasks run to completion by the worker
    executed: AtomicU64,
    /// Executed tasks that returned empty content
    empty_results: AtomicU64,
    /// Results handed to the render callback
    delivered: AtomicU64,
}

impl ChannelMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }

    pub fn inc_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn empty_results(&self) -> u64 {
        self.empty_results.load(Ordering::Relaxed)
    }

    pub fn inc_empty_results(&self) {
        self.empty_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted(),
            dropped: self.dropped(),
            executed: self.executed(),
            empty_results: self.empty_results(),
            delivered: self.delivered(),
        }
    }
}

/// Snapshot of channel metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub submitted: u64,
    pub dropped: u64,
    pub executed: u64,
    pub empty_results: u64,
    pub delivered: u64,
}

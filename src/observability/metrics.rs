//! Metrics registry for foldscan
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing all query counters
///
/// # Thread Safety
///
/// All counters use atomic operations with Relaxed ordering. A registry is
/// shared by every query of a resolver, possibly across threads.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Predicates compiled successfully
    queries_compiled: AtomicU64,
    /// Predicates rejected at compile time
    queries_rejected: AtomicU64,
    /// Cursors opened, one per range
    ranges_scanned: AtomicU64,
    /// Entries read from cursors
    candidates_scanned: AtomicU64,
    /// Candidates discarded by the post-filter
    candidates_rejected: AtomicU64,
    /// Records delivered to the caller
    records_returned: AtomicU64,
    /// Scans that exhausted every range
    scans_completed: AtomicU64,
    /// Scans ended by a failure
    scans_aborted: AtomicU64,
    /// Scans dropped before exhaustion
    scans_cancelled: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_compiled(&self) {
        self.queries_compiled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ranges_scanned(&self) {
        self.ranges_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_candidates_scanned(&self, count: u64) {
        self.candidates_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_candidates_rejected(&self) {
        self.candidates_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_returned(&self) {
        self.records_returned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_scans_completed(&self) {
        self.scans_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_scans_aborted(&self) {
        self.scans_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_scans_cancelled(&self) {
        self.scans_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_compiled: self.queries_compiled.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            ranges_scanned: self.ranges_scanned.load(Ordering::Relaxed),
            candidates_scanned: self.candidates_scanned.load(Ordering::Relaxed),
            candidates_rejected: self.candidates_rejected.load(Ordering::Relaxed),
            records_returned: self.records_returned.load(Ordering::Relaxed),
            scans_completed: self.scans_completed.load(Ordering::Relaxed),
            scans_aborted: self.scans_aborted.load(Ordering::Relaxed),
            scans_cancelled: self.scans_cancelled.load(Ordering::Relaxed),
        }
    }

    /// Get current snapshot of all metrics as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub queries_compiled: u64,
    pub queries_rejected: u64,
    pub ranges_scanned: u64,
    pub candidates_scanned: u64,
    pub candidates_rejected: u64,
    pub records_returned: u64,
    pub scans_completed: u64,
    pub scans_aborted: u64,
    pub scans_cancelled: u64,
}

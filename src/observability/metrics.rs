//! Store counters
//!
//! - Counters only, monotonic
//! - One registry per store instance
//! - Relaxed atomics; values are exact once the store is quiescent

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Per-store operational counters
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Load attempts that touched the filesystem
    load_attempts: AtomicU64,
    /// Load attempts that failed
    load_failures: AtomicU64,
    /// Write tasks persisted
    writes_committed: AtomicU64,
    /// Write tasks that failed to encode or persist
    writes_failed: AtomicU64,
    /// Write tasks that produced no change and skipped the disk
    writes_skipped: AtomicU64,
    /// Cache rollbacks after a failed write
    rollbacks: AtomicU64,
}

impl StoreMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_load_attempts(&self) {
        self.load_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_load_failures(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_writes_committed(&self) {
        self.writes_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_writes_failed(&self) {
        self.writes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_writes_skipped(&self) {
        self.writes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rollbacks(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            load_attempts: self.load_attempts.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            writes_committed: self.writes_committed.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            writes_skipped: self.writes_skipped.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`StoreMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub load_attempts: u64,
    pub load_failures: u64,
    pub writes_committed: u64,
    pub writes_failed: u64,
    pub writes_skipped: u64,
    pub rollbacks: u64,
}

//! Transaction metrics
//!
//! Counters use Relaxed ordering: they are observational only and do not
//! synchronize any other memory operation.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    opened: AtomicU64,
    committed: AtomicU64,
    commit_failures: AtomicU64,
    aborted: AtomicU64,
    immediate_batches: AtomicU64,
    immediate_failures: AtomicU64,
}

impl Counters {
    pub(crate) fn record_open(&self) {
        self.opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit_failure(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abort(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_immediate(&self, ok: bool) {
        self.immediate_batches.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.immediate_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self, open_count: usize) -> TransactionMetrics {
        TransactionMetrics {
            open_count: open_count as u64,
            total_opened: self.opened.load(Ordering::Relaxed),
            total_committed: self.committed.load(Ordering::Relaxed),
            total_commit_failures: self.commit_failures.load(Ordering::Relaxed),
            total_aborted: self.aborted.load(Ordering::Relaxed),
            immediate_batches: self.immediate_batches.load(Ordering::Relaxed),
            immediate_failures: self.immediate_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of a manipulator's transaction statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionMetrics {
    /// Transactions currently holding a pending batch
    pub open_count: u64,
    /// Transactions ever opened
    pub total_opened: u64,
    /// Commits whose batch executed successfully
    pub total_committed: u64,
    /// Commits whose batch failed to execute
    pub total_commit_failures: u64,
    /// Transactions discarded by abort
    pub total_aborted: u64,
    /// Batches executed outside any transaction
    pub immediate_batches: u64,
    /// Immediate batches that failed
    pub immediate_failures: u64,
}

impl TransactionMetrics {
    /// Transactions that reached an end (committed, failed or aborted)
    pub fn total_completed(&self) -> u64 {
        self.total_committed + self.total_commit_failures + self.total_aborted
    }

    /// Successful commits over completed transactions
    pub fn commit_rate(&self) -> f64 {
        let completed = self.total_completed();
        if completed > 0 {
            self.total_committed as f64 / completed as f64
        } else {
            0.0
        }
    }
}

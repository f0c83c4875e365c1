//! Counters for observability.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::OutcomeKind;

/// Point-in-time view of a dispatch queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub submitted: u64,
    pub delivered: u64,
    pub failed: u64,
    pub timed_out: u64,

    /// Tasks still in the backlog (not counting the one in flight).
    pub pending: usize,

    pub draining: bool,
}

impl DispatchStats {
    /// Tasks whose send function has settled, whatever the outcome.
    pub fn settled(&self) -> u64 {
        self.delivered + self.failed + self.timed_out
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    submitted: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

impl Counters {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_settled(&self, kind: OutcomeKind) {
        let counter = match kind {
            OutcomeKind::Delivered => &self.delivered,
            OutcomeKind::Failed => &self.failed,
            OutcomeKind::TimedOut => &self.timed_out,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, pending: usize, draining: bool) -> DispatchStats {
        DispatchStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            pending,
            draining,
        }
    }
}

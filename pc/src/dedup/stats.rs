//! Deduplication counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Live counters (thread-safe)
#[derive(Debug, Default)]
pub(crate) struct DedupCounters {
    pub submissions: AtomicU64,
    pub dispatched: AtomicU64,
    pub coalesced: AtomicU64,
    pub passthrough: AtomicU64,
    pub evicted: AtomicU64,
}

impl DedupCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> DedupStats {
        let dispatched = self.dispatched.load(Ordering::SeqCst);
        let evicted = self.evicted.load(Ordering::SeqCst);
        DedupStats {
            submissions: self.submissions.load(Ordering::SeqCst),
            dispatched,
            coalesced: self.coalesced.load(Ordering::SeqCst),
            passthrough: self.passthrough.load(Ordering::SeqCst),
            evicted,
            pending: dispatched.saturating_sub(evicted),
        }
    }
}

/// Point-in-time view of a deduplicator's activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Every call to `submit`
    pub submissions: u64,
    /// Underlying calls issued for watched URLs
    pub dispatched: u64,
    /// Watched submissions served an existing handle
    pub coalesced: u64,
    /// Submissions to unwatched URLs
    pub passthrough: u64,
    /// Entries removed after their grace window
    pub evicted: u64,
    /// Entries still in the map (in flight or inside the grace window)
    pub pending: u64,
}

impl DedupStats {
    /// Total underlying network calls, watched or not
    pub fn network_calls(&self) -> u64 {
        self.dispatched + self.passthrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_derives_pending() {
        let counters = DedupCounters::default();
        DedupCounters::bump(&counters.dispatched);
        DedupCounters::bump(&counters.dispatched);
        DedupCounters::bump(&counters.evicted);
        DedupCounters::bump(&counters.passthrough);

        let stats = counters.snapshot();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.network_calls(), 3);
    }
}

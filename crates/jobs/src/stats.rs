//! Per-tier cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters updated from the table's lookup path.
#[derive(Debug, Default)]
pub(crate) struct TierCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl TierCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time statistics for one tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierStats {
    pub tier: String,
    /// Records currently in the map (pending or cached).
    pub live: usize,
    /// Lookups served by an existing record, pending or completed.
    pub hits: u64,
    /// Lookups that created a record (and spawned a worker).
    pub misses: u64,
    /// Expired records removed on lookup.
    pub evictions: u64,
    pub ttl_secs: u64,
}

impl TierStats {
    pub(crate) fn from_counters(
        tier: &str,
        live: usize,
        ttl_secs: u64,
        counters: &TierCounters,
    ) -> Self {
        Self {
            tier: tier.to_string(),
            live,
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            evictions: counters.evictions.load(Ordering::Relaxed),
            ttl_secs,
        }
    }

    /// Share of lookups served without new work (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

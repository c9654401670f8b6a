//! Key → live record map shared by both tiers.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::lock;
use crate::record::{JobRecord, JobSnapshot};
use crate::stats::{TierCounters, TierStats};

/// Result of a locked lookup-or-create step.
#[derive(Debug)]
pub enum Lookup<K> {
    /// A live record already existed (pending, or completed within the TTL).
    Existing(Arc<JobRecord<K>>),
    /// No live record existed; the caller must start a worker for this one.
    Created(Arc<JobRecord<K>>),
}

impl<K> Lookup<K> {
    pub fn record(&self) -> &Arc<JobRecord<K>> {
        match self {
            Lookup::Existing(record) | Lookup::Created(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Lookup::Created(_))
    }

    pub fn into_record(self) -> Arc<JobRecord<K>> {
        match self {
            Lookup::Existing(record) | Lookup::Created(record) => record,
        }
    }
}

/// At most one live record per key, with lazy TTL eviction.
///
/// The map lock is held only for the lookup/evict/insert sequence. It is never
/// held across an `.await`, and workers never take it.
#[derive(Debug)]
pub struct JobTable<K> {
    tier: &'static str,
    ttl: Duration,
    jobs: Mutex<HashMap<K, Arc<JobRecord<K>>>>,
    counters: TierCounters,
}

impl<K> JobTable<K>
where
    K: Eq + Hash + Clone + Display,
{
    pub fn new(tier: &'static str, ttl: Duration) -> Self {
        Self {
            tier,
            ttl,
            jobs: Mutex::new(HashMap::new()),
            counters: TierCounters::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the live record for `key`, creating one if none exists.
    ///
    /// A completed record older than the TTL is evicted and replaced under the
    /// same lock, so racing callers at the expiry boundary still get a single
    /// new record.
    pub fn get_or_insert(&self, key: &K) -> Lookup<K> {
        let mut jobs = lock(&self.jobs);

        if let Some(existing) = jobs.get(key) {
            if !existing.is_expired(self.ttl, Instant::now()) {
                self.counters.hit();
                debug!(tier = self.tier, key = %key, "cache hit");
                return Lookup::Existing(Arc::clone(existing));
            }

            debug!(tier = self.tier, key = %key, "ttl expired, evicting");
            jobs.remove(key);
            self.counters.eviction();
        }

        debug!(tier = self.tier, key = %key, "creating job");
        let record = Arc::new(JobRecord::new(key.clone()));
        jobs.insert(key.clone(), Arc::clone(&record));
        self.counters.miss();

        Lookup::Created(record)
    }

    /// Peek at the record currently mapped for `key`, without eviction.
    pub fn get(&self, key: &K) -> Option<Arc<JobRecord<K>>> {
        lock(&self.jobs).get(key).cloned()
    }

    /// Number of records in the map, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        lock(&self.jobs).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> TierStats {
        TierStats::from_counters(self.tier, self.len(), self.ttl.as_secs(), &self.counters)
    }

    pub fn snapshots(&self) -> Vec<JobSnapshot> {
        let records: Vec<_> = lock(&self.jobs).values().cloned().collect();
        let mut snapshots: Vec<_> = records.iter().map(|r| r.snapshot()).collect();
        snapshots.sort_by(|a, b| a.key.cmp(&b.key));
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::JobState;

    fn table(ttl_secs: u64) -> JobTable<String> {
        JobTable::new("test", Duration::from_secs(ttl_secs))
    }

    #[tokio::test]
    async fn second_lookup_hits_pending_record() {
        let table = table(60);
        let key = "a".to_string();

        let first = table.get_or_insert(&key);
        let second = table.get_or_insert(&key);

        assert!(first.is_created());
        assert!(!second.is_created());
        assert!(Arc::ptr_eq(first.record(), second.record()));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let table = table(60);
        let a = table.get_or_insert(&"a".to_string());
        let b = table.get_or_insert(&"b".to_string());

        assert!(a.is_created() && b.is_created());
        assert_eq!(table.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_record_survives_zero_ttl() {
        let table = table(0);
        let key = "a".to_string();
        let first = table.get_or_insert(&key).into_record();

        tokio::time::advance(Duration::from_secs(3600)).await;

        let again = table.get_or_insert(&key);
        assert!(!again.is_created());
        assert!(Arc::ptr_eq(&first, again.record()));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_record_is_replaced() {
        let table = table(10);
        let key = "a".to_string();
        let first = table.get_or_insert(&key).into_record();
        first.complete(Ok("v".to_string()));

        tokio::time::advance(Duration::from_secs(11)).await;

        let replaced = table.get_or_insert(&key);
        assert!(replaced.is_created());
        assert!(!Arc::ptr_eq(&first, replaced.record()));
        assert_eq!(replaced.record().state(), JobState::Pending);
        assert_eq!(table.len(), 1);

        let stats = table.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn snapshots_are_sorted_by_key() {
        let table = table(60);
        table.get_or_insert(&"b".to_string());
        table.get_or_insert(&"a".to_string());

        let keys: Vec<_> = table.snapshots().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}

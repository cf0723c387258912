// Polling query-cache port. The real REST client lives outside this crate; this
// module holds the boundary traits plus the per-key bookkeeping the sync worker
// drives: refetch intervals, stale marking, and the supersede rule (a fetch
// result is discarded when a newer fetch for the same key has already begun).

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{InvalidationKey, TimestampedRecord};
use serde::Deserialize;
use tracing::debug;

/// Signal that a key's cached data is out of date and must be refetched.
pub trait CacheInvalidate {
    fn invalidate(&self, key: &InvalidationKey);
}

/// Boundary to the external fetch layer. Timeouts and retries are its concern;
/// this crate assumes a fetch eventually resolves or rejects.
pub trait RecordFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        key: &InvalidationKey,
    ) -> impl Future<Output = anyhow::Result<Vec<TimestampedRecord>>> + Send;
}

/// Refetch/stale timing for the polling loop. One of these applies per key:
/// the cache-wide default, or a per-key override.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    pub refetch_interval_ms: i64,
    pub stale_time_ms: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refetch_interval_ms: 30_000,
            stale_time_ms: 10_000,
        }
    }
}

#[derive(Debug, Default)]
struct Entry {
    records: Vec<TimestampedRecord>,
    /// Bumped by begin_fetch; an apply with an older generation is discarded.
    generation: u64,
    fetched_at_ms: Option<i64>,
    stale: bool,
}

/// Local record store for the dashboard's fixed key set.
#[derive(Debug)]
pub struct PollingCache {
    config: CacheConfig,
    key_configs: HashMap<InvalidationKey, CacheConfig>,
    entries: Mutex<HashMap<InvalidationKey, Entry>>,
}

impl PollingCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            key_configs: HashMap::new(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the refetch/stale timing for one key (e.g. a slow-moving
    /// health query polled less often than the event feeds).
    pub fn with_key_config(mut self, key: &InvalidationKey, config: CacheConfig) -> Self {
        self.key_configs.insert(key.clone(), config);
        self
    }

    fn key_config(&self, key: &InvalidationKey) -> &CacheConfig {
        self.key_configs.get(key).unwrap_or(&self.config)
    }

    /// Registers a fetch in flight and returns its generation token.
    /// Starting a newer fetch supersedes any still-pending older one.
    pub fn begin_fetch(&self, key: &InvalidationKey) -> u64 {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(key.clone()).or_default();
        entry.generation += 1;
        entry.generation
    }

    /// Stores a completed fetch. Returns false (and drops the records) when a
    /// newer fetch for the key began after this one, so a slow response can
    /// never overwrite fresher data.
    pub fn apply(
        &self,
        key: &InvalidationKey,
        generation: u64,
        records: Vec<TimestampedRecord>,
        now_ms: i64,
    ) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(key.clone()).or_default();
        if generation != entry.generation {
            debug!(key = %key, generation, latest = entry.generation, "superseded fetch discarded");
            return false;
        }
        entry.records = records;
        entry.fetched_at_ms = Some(now_ms);
        entry.stale = false;
        true
    }

    /// Snapshot of the key's current records (empty when never fetched).
    pub fn records(&self, key: &InvalidationKey) -> Vec<TimestampedRecord> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .map(|e| e.records.clone())
            .unwrap_or_default()
    }

    /// True when the key was never fetched, was invalidated, or its refetch
    /// interval has elapsed.
    pub fn needs_fetch(&self, key: &InvalidationKey, now_ms: i64) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            None => true,
            Some(e) => {
                e.stale
                    || match e.fetched_at_ms {
                        None => true,
                        Some(at) => now_ms - at >= self.key_config(key).refetch_interval_ms,
                    }
            }
        }
    }

    /// True when the key has data younger than `stale_time_ms`.
    pub fn is_fresh(&self, key: &InvalidationKey, now_ms: i64) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .and_then(|e| e.fetched_at_ms)
            .is_some_and(|at| now_ms - at < self.key_config(key).stale_time_ms)
    }
}

impl CacheInvalidate for PollingCache {
    fn invalidate(&self, key: &InvalidationKey) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.entry(key.clone()).or_default().stale = true;
    }
}

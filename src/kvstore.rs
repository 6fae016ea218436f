//! The `$kvstore` service
//!
//! An in-process key/value cache backed by moka. Entries may carry their
//! own time to live; the store holds at most a fixed number of entries and
//! evicts the least useful ones beyond that.

use moka::Expiry;
use moka::sync::Cache;
use std::time::{Duration, Instant};

/// Entries kept by [`KvStore::new`]
pub const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
}

struct PerEntry;

impl Expiry<String, Entry> for PerEntry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// An in-process key/value cache with optional expiry.
///
/// Clones share the same store.
#[derive(Clone)]
pub struct KvStore {
    cache: Cache<String, Entry>,
}

impl Default for KvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A store holding at most `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        tracing::debug!("Creating key/value store (capacity {})", max_capacity);
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntry)
            .build();
        Self { cache }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).map(|entry| entry.value)
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key.into(), value.into(), None);
    }

    /// Store `value` until `ttl` has elapsed.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        self.insert(key.into(), value.into(), Some(ttl));
    }

    fn insert(&self, key: String, value: String, ttl: Option<Duration>) {
        self.cache.insert(key, Entry { value, ttl });
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.cache.remove(key).map(|entry| entry.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Number of live entries. Runs pending evictions first, so this walks
    /// the whole store.
    pub fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

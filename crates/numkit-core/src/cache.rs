//! Mutex-guarded memoization cache.
//!
//! All reads and writes against one `SharedCache` are serialized by a single
//! lock, so operations are totally ordered and never observe a torn map.
//! Share it across threads through an `Arc`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

/// Hit/miss/insert counters of a [`SharedCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that found a value.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Calls to `insert`.
    pub inserts: u64,
}

/// A key/value store with exclusive access, used for memoization.
pub struct SharedCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            inserts: AtomicU64::new(0),
        }
    }

    /// Create a cache seeded with known entries. Seeding does not count as
    /// inserts in [`CacheStats`].
    #[must_use]
    pub fn with_entries(seed: impl IntoIterator<Item = (K, V)>) -> Self {
        let cache = Self::new();
        cache.entries.lock().extend(seed);
        cache
    }

    /// Look up a key, returning a copy of its value if present.
    pub fn get(&self, key: &K) -> Option<V> {
        let found = self.entries.lock().get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a value, replacing any previous one.
    pub fn insert(&self, key: K, value: V) {
        self.entries.lock().insert(key, value);
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Check whether a key is present without touching the counters.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> Default for SharedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

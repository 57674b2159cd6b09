//! Cache Store Module
//!
//! Bounded cache engine combining HashMap indexing with an LRU list and TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::cache::stats::format_ttl;
use crate::cache::{CacheCounters, CacheEntry, CacheStats, LruList, NodeId};

/// Reporting name used by [`BoundedTtlCache::new`].
pub const DEFAULT_CACHE_NAME: &str = "cache";

// == Inner State ==
/// Index and recency list, always mutated together under one lock.
#[derive(Debug)]
struct Inner<K, V> {
    index: HashMap<K, NodeId>,
    order: LruList<CacheEntry<K, V>>,
    counters: CacheCounters,
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            order: LruList::new(),
            counters: CacheCounters::default(),
        }
    }

    /// Removes every entry matching `pred` in a single pass over the list.
    fn remove_matching<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&CacheEntry<K, V>) -> bool,
    {
        let doomed: Vec<NodeId> = self
            .order
            .iter()
            .filter(|(_, entry)| pred(*entry))
            .map(|(id, _)| id)
            .collect();

        for &id in &doomed {
            if let Some(entry) = self.order.remove(id) {
                self.index.remove(&entry.key);
            }
        }
        doomed.len()
    }
}

// == Bounded TTL Cache ==
/// Thread-safe key/value cache with a fixed capacity, per-entry TTL and LRU eviction.
///
/// Expired entries are dropped lazily when read and actively by
/// [`clean_expired`](Self::clean_expired). The cache never loads values on its
/// own: on a miss the caller computes the value without holding any cache
/// lock and stores it back with [`set`](Self::set).
///
/// # Example
/// ```
/// use std::time::Duration;
/// use cache_janitor::cache::BoundedTtlCache;
///
/// let cache = BoundedTtlCache::named("users", 2, Duration::from_secs(60));
/// cache.set("alice".to_string(), 1, None);
/// cache.set("bob".to_string(), 2, None);
/// cache.get("alice");
/// cache.set("carol".to_string(), 3, None);
///
/// // bob was the least recently used entry
/// assert_eq!(cache.get("bob"), None);
/// assert_eq!(cache.get("alice"), Some(1));
/// ```
#[derive(Debug)]
pub struct BoundedTtlCache<K, V> {
    name: String,
    max_size: usize,
    default_ttl: Duration,
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> BoundedTtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a cache holding at most `max_size` entries.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries, a value of 0 is treated as 1
    /// * `default_ttl` - Lifetime used when `set` is called without a TTL
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self::named(DEFAULT_CACHE_NAME, max_size, default_ttl)
    }

    /// Creates a cache that reports itself under `name`.
    pub fn named(name: impl Into<String>, max_size: usize, default_ttl: Duration) -> Self {
        Self {
            name: name.into(),
            max_size: max_size.max(1),
            default_ttl,
            inner: RwLock::new(Inner::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit refreshes the entry to most recently used. An expired entry is
    /// removed on the spot and reported as absent.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        // Write lock: a hit reorders the recency list
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let Some(&id) = inner.index.get(key) else {
            inner.counters.record_miss();
            return None;
        };

        let expired = inner
            .order
            .get(id)
            .map_or(true, |entry| entry.is_expired_at(now));
        if expired {
            inner.index.remove(key);
            inner.order.remove(id);
            inner.counters.record_miss();
            return None;
        }

        inner.order.move_to_front(id);
        match inner.order.get_mut(id) {
            Some(entry) => {
                entry.last_used_at = now;
                inner.counters.record_hit();
                Some(entry.value.clone())
            }
            None => {
                inner.counters.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// Overwriting an existing key replaces its value, restarts its TTL and
    /// marks it most recently used without changing the entry count. Inserting
    /// a new key into a full cache first evicts the least recently used entry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Entry lifetime; `None` or a zero duration uses the default TTL
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        self.set_evicting(key, value, ttl);
    }

    /// Same as [`set`](Self::set), returning the entry evicted to make room.
    pub(crate) fn set_evicting(&self, key: K, value: V, ttl: Option<Duration>) -> Option<(K, V)> {
        let ttl = self.effective_ttl(ttl);
        let now = Instant::now();
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        // Overwrite case
        if let Some(&id) = inner.index.get(&key) {
            if let Some(entry) = inner.order.get_mut(id) {
                entry.refresh(value, ttl, now);
            }
            inner.order.move_to_front(id);
            return None;
        }

        // At capacity: drop the coldest entry
        let mut evicted = None;
        if inner.index.len() >= self.max_size {
            if let Some(entry) = inner.order.pop_back() {
                inner.index.remove(&entry.key);
                inner.counters.record_eviction();
                evicted = Some((entry.key, entry.value));
            }
        }

        let id = inner
            .order
            .push_front(CacheEntry::new(key.clone(), value, ttl, now));
        inner.index.insert(key, id);
        evicted
    }

    /// Stores a key-value pair with the default TTL.
    pub fn set_default(&self, key: K, value: V) {
        self.set(key, value, None);
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if it was stored.
    ///
    /// Absent keys are a no-op.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let id = inner.index.remove(key)?;
        inner.order.remove(id).map(|entry| entry.value)
    }

    /// Removes the entry under `key` only if `pred` accepts its value.
    pub(crate) fn remove_if_value<Q, F>(&self, key: &Q, pred: F) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> bool,
    {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let id = *inner.index.get(key)?;
        if !inner.order.get(id).is_some_and(|entry| pred(&entry.value)) {
            return None;
        }
        inner.index.remove(key);
        inner.order.remove(id).map(|entry| entry.value)
    }

    // == Bulk Removal ==
    /// Removes every entry for which `pred(key, value)` holds.
    ///
    /// Returns the number of entries removed.
    pub fn remove_if<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.inner
            .write()
            .remove_matching(|entry| pred(&entry.key, &entry.value))
    }

    /// Removes every entry whose key matches `pred`.
    pub fn remove_by_key<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        self.inner.write().remove_matching(|entry| pred(&entry.key))
    }

    /// Removes every entry whose value matches `pred`.
    pub fn remove_by_value<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&V) -> bool,
    {
        self.inner.write().remove_matching(|entry| pred(&entry.value))
    }

    // == Cleanup Expired ==
    /// Removes all entries whose expiry has passed.
    ///
    /// Returns the number of entries removed.
    pub fn clean_expired(&self) -> usize {
        let now = Instant::now();
        self.inner
            .write()
            .remove_matching(|entry| entry.is_expired_at(now))
    }

    // == Clear ==
    /// Drops every entry. Traffic counters are kept.
    pub fn clear(&self) {
        let mut guard = self.inner.write();
        guard.index = HashMap::new();
        guard.order = LruList::new();
    }

    // == Length ==
    /// Returns the number of stored entries.
    ///
    /// Expired entries count until they are swept or touched.
    pub fn size(&self) -> usize {
        self.inner.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Checks for a live entry without refreshing its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let inner = self.inner.read();
        inner
            .index
            .get(key)
            .and_then(|&id| inner.order.get(id))
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    pub fn counters(&self) -> CacheCounters {
        self.inner.read().counters
    }

    // == Stats ==
    /// Builds a statistics snapshot.
    ///
    /// Counting expired entries walks the whole cache, so this is meant for
    /// diagnostics rather than the request path.
    pub fn get_stats(&self) -> CacheStats {
        let now = Instant::now();
        let inner = self.inner.read();
        let expired_count = inner
            .order
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .count();

        CacheStats {
            name: self.name.clone(),
            current_size: inner.index.len(),
            max_size: self.max_size,
            expired_count,
            ttl: format_ttl(self.default_ttl),
            ttl_seconds: self.default_ttl.as_secs(),
            counters: inner.counters,
        }
    }

    fn effective_ttl(&self, ttl: Option<Duration>) -> Duration {
        match ttl {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => self.default_ttl,
        }
    }

    /// Checks that the index and the recency list hold the same entries.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let inner = self.inner.read();
        if inner.index.len() != inner.order.len() || inner.index.len() > self.max_size {
            return false;
        }
        let walked = inner
            .order
            .iter()
            .filter(|(id, entry)| inner.index.get(&entry.key) == Some(id))
            .count();
        walked == inner.index.len()
    }
}

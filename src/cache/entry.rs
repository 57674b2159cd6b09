//! Cache Entry Module
//!
//! Defines the record held for every key of a bounded cache.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single cached record.
///
/// Entries are owned by exactly one [`BoundedTtlCache`](super::BoundedTtlCache)
/// and live inside its recency list.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The key this entry is stored under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Point in time at which the entry stops being served, `None` when the
    /// lifetime reaches past what the clock can represent
    pub expires_at: Option<Instant>,
    /// Last time the entry was written or read
    pub last_used_at: Instant,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after `now`.
    pub fn new(key: K, value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            key,
            value,
            expires_at: now.checked_add(ttl),
            last_used_at: now,
        }
    }

    // == Refresh ==
    /// Replaces the value and restarts the TTL from `now`.
    pub fn refresh(&mut self, value: V, ttl: Duration, now: Instant) {
        self.value = value;
        self.expires_at = now.checked_add(ttl);
        self.last_used_at = now;
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so an
    /// entry written with a zero-length lifetime is expired on the next check.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

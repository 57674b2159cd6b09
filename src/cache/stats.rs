//! Cache Statistics Module
//!
//! Point-in-time snapshots of a cache's occupancy and traffic counters.

use std::time::Duration;

use serde::Serialize;

// == Counters ==
/// Running traffic counters kept by each bounded cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheCounters {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups that found nothing or an expired entry
    pub misses: u64,
    /// Number of entries dropped by the LRU policy
    pub evictions: u64,
}

impl CacheCounters {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Cache Stats ==
/// Snapshot describing one bounded cache.
///
/// Computed on demand and never stored by the cache itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reporting name of the cache
    pub name: String,
    /// Live entry count, including expired entries not yet swept
    pub current_size: usize,
    /// Capacity of the cache
    pub max_size: usize,
    /// Entries past their expiry that are still stored
    pub expired_count: usize,
    /// Default TTL rendered for humans, e.g. `"1h 30m"`
    pub ttl: String,
    /// Default TTL in whole seconds
    pub ttl_seconds: u64,
    /// Traffic counters at snapshot time
    #[serde(flatten)]
    pub counters: CacheCounters,
}

impl CacheStats {
    // == Usage ==
    /// Returns `current_size / max_size * 100`, or 0.0 for a zero capacity.
    pub fn usage_percent(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            self.current_size as f64 * 100.0 / self.max_size as f64
        }
    }
}

// == TTL Formatting ==
/// Renders a duration as a chain of days, hours, minutes and seconds.
///
/// Zero-valued units are omitted: 90 minutes is `"1h 30m"`, 45 seconds is
/// `"45s"`. A zero duration renders as `"0s"`. Sub-second precision is dropped.
pub fn format_ttl(ttl: Duration) -> String {
    let total = ttl.as_secs();
    if total == 0 {
        return "0s".to_string();
    }

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")]
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{}{}", amount, unit))
        .collect::<Vec<_>>()
        .join(" ")
}

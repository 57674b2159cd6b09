//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::cache::CacheStats;

/// One cache as rendered by the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsView {
    pub name: String,
    pub current_size: usize,
    pub max_size: usize,
    pub expired_count: usize,
    /// Human readable default TTL
    pub ttl: String,
    pub ttl_seconds: u64,
    /// `current_size / max_size * 100`, 0 for a zero capacity
    pub usage_percent: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsView {
    fn from(stats: CacheStats) -> Self {
        Self {
            usage_percent: stats.usage_percent(),
            hit_rate: stats.counters.hit_rate(),
            hits: stats.counters.hits,
            misses: stats.counters.misses,
            evictions: stats.counters.evictions,
            name: stats.name,
            current_size: stats.current_size,
            max_size: stats.max_size,
            expired_count: stats.expired_count,
            ttl: stats.ttl,
            ttl_seconds: stats.ttl_seconds,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of registered caches, including ones that report no statistics
    pub registered: usize,
    /// Sum of entries across the reported caches
    pub total_entries: usize,
    /// Per-cache statistics sorted by name
    pub caches: Vec<CacheStatsView>,
}

impl StatsResponse {
    /// Builds the response from an unordered, possibly empty stats list
    pub fn new(registered: usize, stats: Vec<CacheStats>) -> Self {
        let mut caches: Vec<CacheStatsView> = stats.into_iter().map(CacheStatsView::from).collect();
        caches.sort_by(|a, b| a.name.cmp(&b.name));
        let total_entries = caches.iter().map(|c| c.current_size).sum();

        Self {
            registered,
            total_entries,
            caches,
        }
    }
}

/// Response body for the sweep endpoint (POST /clean)
#[derive(Debug, Clone, Serialize)]
pub struct CleanResponse {
    /// Entries removed per cache name
    pub removed: BTreeMap<String, usize>,
    /// Entries removed in total
    pub total_removed: usize,
}

impl CleanResponse {
    pub fn new(removed: HashMap<String, usize>) -> Self {
        let total_removed = removed.values().sum();
        Self {
            removed: removed.into_iter().collect(),
            total_removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether the background sweep task is alive
    pub sweeping: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(sweeping: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            sweeping,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

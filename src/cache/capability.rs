//! Cache Capability Module
//!
//! The minimal surface a cache exposes to take part in coordinated cleanup
//! and statistics reporting.

use std::hash::Hash;

use crate::cache::{BoundedTtlCache, CacheStats};

// == Stats Report ==
/// What a cache contributes to aggregated statistics.
///
/// Composite caches that keep several bounded caches report one record per
/// sub-cache through [`StatsReport::Many`].
#[derive(Debug, Clone, PartialEq)]
pub enum StatsReport {
    /// The cache does not report statistics
    None,
    /// A single statistics record
    One(CacheStats),
    /// One record per internal sub-cache
    Many(Vec<CacheStats>),
}

impl StatsReport {
    /// Flattens the report into a list of records.
    pub fn into_vec(self) -> Vec<CacheStats> {
        match self {
            StatsReport::None => Vec::new(),
            StatsReport::One(stats) => vec![stats],
            StatsReport::Many(stats) => stats,
        }
    }
}

// == Cleanable ==
/// A cache that can be swept by the cleanup coordinator.
///
/// Implementations manage their own locking; the coordinator only calls
/// these methods and never sees keys or values.
pub trait Cleanable: Send + Sync {
    /// Removes all expired entries and returns how many were removed.
    fn clean_expired(&self) -> usize;

    /// Returns the number of stored entries.
    fn size(&self) -> usize;

    /// Reports statistics for aggregation. Defaults to reporting nothing.
    fn report_stats(&self) -> StatsReport {
        StatsReport::None
    }
}

impl<K, V> Cleanable for BoundedTtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn clean_expired(&self) -> usize {
        BoundedTtlCache::clean_expired(self)
    }

    fn size(&self) -> usize {
        BoundedTtlCache::size(self)
    }

    fn report_stats(&self) -> StatsReport {
        StatsReport::One(self.get_stats())
    }
}

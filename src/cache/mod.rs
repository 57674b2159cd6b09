//! Cache Module
//!
//! Provides bounded in-memory caches with TTL expiration and LRU eviction,
//! plus the capability surface used by the cleanup coordinator.

mod capability;
mod composite;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use capability::{Cleanable, StatsReport};
pub use composite::{DualKeyCache, IdCodeCache};
pub use entry::CacheEntry;
pub use lru::{LruList, NodeId};
pub use stats::{format_ttl, CacheCounters, CacheStats};
pub use store::{BoundedTtlCache, DEFAULT_CACHE_NAME};

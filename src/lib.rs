//! Cache Janitor - bounded in-process caches with coordinated cleanup
//!
//! Provides generic caches with TTL expiration and LRU eviction, and a
//! coordinator that sweeps and reports on any number of them.

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{BoundedTtlCache, CacheStats, Cleanable, StatsReport};
pub use config::Config;
pub use coordinator::CleanupCoordinator;
pub use error::CoordinatorError;

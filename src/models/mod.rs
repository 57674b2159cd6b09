//! Request and Response models for the diagnostics API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::CleanQuery;
pub use responses::{CacheStatsView, CleanResponse, HealthResponse, StatsResponse};

//! API Module
//!
//! HTTP handlers and routing for the cache diagnostics surface.
//!
//! # Endpoints
//! - `GET /health` - Health check, including whether sweeping is active
//! - `GET /stats` - Aggregated statistics of every registered cache
//! - `POST /clean` - Sweep all caches, or one via `?cache=<name>`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

//! API Handlers
//!
//! HTTP request handlers for each diagnostics endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::coordinator::CleanupCoordinator;
use crate::error::{CoordinatorError, Result};
use crate::models::{CleanQuery, CleanResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// Holds the coordinator; caches stay owned by whoever registered them.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<CleanupCoordinator>,
}

impl AppState {
    /// Creates a new AppState around an existing coordinator.
    pub fn new(coordinator: Arc<CleanupCoordinator>) -> Self {
        Self { coordinator }
    }
}

/// Handler for GET /stats
///
/// Returns statistics for every cache that reports them. An empty list is a
/// valid answer.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let registered = state.coordinator.len();
    let stats = state.coordinator.get_all_stats();

    Json(StatsResponse::new(registered, stats))
}

/// Handler for POST /clean
///
/// Sweeps every registered cache, or only the one named by `?cache=`.
pub async fn clean_handler(
    State(state): State<AppState>,
    Query(query): Query<CleanQuery>,
) -> Result<Json<CleanResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CoordinatorError::InvalidRequest(error_msg));
    }

    let removed = match query.cache {
        Some(name) => {
            let count = state
                .coordinator
                .clean_one(&name)
                .ok_or_else(|| CoordinatorError::UnknownCache(name.clone()))?;
            HashMap::from([(name, count)])
        }
        None => state.coordinator.clean_all(),
    };

    Ok(Json(CleanResponse::new(removed)))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.coordinator.is_running()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::cache::BoundedTtlCache;

    fn state_with_cache() -> (AppState, Arc<BoundedTtlCache<String, String>>) {
        let coordinator = Arc::new(CleanupCoordinator::new());
        let cache = Arc::new(BoundedTtlCache::named("users", 4, Duration::from_secs(60)));
        coordinator.register_cache("users", cache.clone());
        (AppState::new(coordinator), cache)
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (state, cache) = state_with_cache();
        cache.set("a".to_string(), "1".to_string(), None);

        let response = stats_handler(State(state)).await;
        assert_eq!(response.registered, 1);
        assert_eq!(response.total_entries, 1);
        assert_eq!(response.caches[0].name, "users");
        assert_eq!(response.caches[0].usage_percent, 25.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clean_handler_all() {
        let (state, cache) = state_with_cache();
        cache.set("a".to_string(), "1".to_string(), Some(Duration::from_secs(1)));
        tokio::time::sleep(Duration::from_secs(2)).await;

        let response = clean_handler(State(state), Query(CleanQuery::default()))
            .await
            .unwrap();
        assert_eq!(response.total_removed, 1);
        assert_eq!(response.removed["users"], 1);
    }

    #[tokio::test]
    async fn test_clean_handler_unknown_cache() {
        let (state, _cache) = state_with_cache();

        let query = CleanQuery {
            cache: Some("missing".to_string()),
        };
        let result = clean_handler(State(state), Query(query)).await;
        assert!(matches!(result, Err(CoordinatorError::UnknownCache(_))));
    }

    #[tokio::test]
    async fn test_clean_handler_blank_name() {
        let (state, _cache) = state_with_cache();

        let query = CleanQuery {
            cache: Some(String::new()),
        };
        let result = clean_handler(State(state), Query(query)).await;
        assert!(matches!(result, Err(CoordinatorError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let (state, _cache) = state_with_cache();

        let response = health_handler(State(state)).await;
        assert_eq!(response.status, "healthy");
        assert!(!response.sweeping);
    }
}

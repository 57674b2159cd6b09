//! Request DTOs for the diagnostics API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

/// Query parameters for the sweep endpoint (POST /clean)
///
/// # Fields
/// - `cache`: Optional name of a single cache to sweep; all caches when absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanQuery {
    /// Name of the cache to sweep
    #[serde(default)]
    pub cache: Option<String>,
}

impl CleanQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match &self.cache {
            Some(name) if name.trim().is_empty() => Some("Cache name cannot be empty".to_string()),
            _ => None,
        }
    }
}

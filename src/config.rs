//! Configuration Module
//!
//! Handles loading cache and diagnostics server settings from environment variables.

use std::env;
use std::time::Duration;

// == Defaults ==
const DEFAULT_MAX_ENTRIES: usize = 1000;
const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the default cache can hold
    pub max_entries: usize,
    /// Default TTL in seconds for entries stored without explicit TTL
    pub default_ttl: u64,
    /// Diagnostics HTTP server port
    pub server_port: u16,
    /// Seconds between background sweeps
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - Diagnostics server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(DEFAULT_MAX_ENTRIES),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(DEFAULT_TTL_SECS),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
        }
    }

    /// Default TTL as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Sweep interval as a `Duration`, never shorter than one second.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL_SECS,
            server_port: DEFAULT_SERVER_PORT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_config_durations() {
        let config = Config {
            cleanup_interval: 0,
            ..Config::default()
        };
        assert_eq!(config.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.cleanup_interval(), Duration::from_secs(1));
    }

    // Single test touching the environment to avoid races between tests
    #[test]
    fn test_config_from_env() {
        env::remove_var("MAX_ENTRIES");
        env::remove_var("DEFAULT_TTL");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");
        assert_eq!(Config::from_env(), Config::default());

        env::set_var("MAX_ENTRIES", "25");
        env::set_var("CLEANUP_INTERVAL", "not-a-number");
        let config = Config::from_env();
        assert_eq!(config.max_entries, 25);
        assert_eq!(config.cleanup_interval, 60);

        env::remove_var("MAX_ENTRIES");
        env::remove_var("CLEANUP_INTERVAL");
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the observation API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Bind address (e.g., "0.0.0.0:24500").
    pub bind_address: String,

    /// Base URL of the dataset API.
    pub dataset_api_url: String,

    /// Base URL of the graph gateway that serves CSV row streams.
    pub graph_api_url: String,

    /// Service auth token forwarded to upstream clients.
    pub service_auth_token: String,

    /// Maximum number of observations returned per query.
    pub default_observation_limit: usize,

    /// When false, only published datasets and versions are visible,
    /// regardless of caller identity.
    pub enable_private_endpoints: bool,

    /// Seconds to wait for in-flight requests on shutdown.
    pub graceful_shutdown_secs: u64,

    /// Cardinality-probe fan-out settings.
    pub cardinality: CardinalityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:24500".to_string(),
            dataset_api_url: "http://localhost:22000".to_string(),
            graph_api_url: "http://localhost:8493".to_string(),
            service_auth_token: String::new(),
            default_observation_limit: 10_000,
            enable_private_endpoints: false,
            graceful_shutdown_secs: 5,
            cardinality: CardinalityConfig::default(),
        }
    }
}

/// Settings for the dimension cardinality sorter's probe fan-out.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct CardinalityConfig {
    /// Maximum concurrent option-count probes.
    pub concurrency: usize,

    /// Stop launching new probes once more than this many have failed.
    /// In-flight probes are still joined.
    pub failure_threshold: u32,
}

impl Default for CardinalityConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            failure_threshold: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_address, "0.0.0.0:24500");
        assert_eq!(config.default_observation_limit, 10_000);
        assert!(!config.enable_private_endpoints);
        assert_eq!(config.cardinality.concurrency, 10);
        assert_eq!(config.cardinality.failure_threshold, 2);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("enable_private_endpoints = true").unwrap();
        assert!(config.enable_private_endpoints);
        assert_eq!(config.dataset_api_url, "http://localhost:22000");
    }
}

// Copyright 2025 Cowboy AI, LLC.

//! Service configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Configuration for the classification service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the remote policy service (e.g., "http://localhost:8080/corepolicy")
    pub policy_api_url: String,

    /// Request timeout for remote calls in seconds
    pub request_timeout_secs: u64,

    /// Lifetime of cached Policies in seconds (0 = no expiry)
    pub cache_duration_secs: u64,

    /// Maximum number of cached Policies
    pub cache_capacity: usize,

    /// Page size used when a caller does not supply one
    pub default_page_size: usize,

    /// Maximum nesting depth accepted for condition trees
    pub max_condition_depth: usize,

    /// Maximum number of nodes accepted for a single condition tree
    pub max_condition_nodes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            policy_api_url: "http://localhost:8080/corepolicy".to_string(),
            request_timeout_secs: 30,
            cache_duration_secs: 600,
            cache_capacity: 1000,
            default_page_size: 100,
            max_condition_depth: 64,
            max_condition_nodes: 10_000,
        }
    }
}

impl ServiceConfig {
    /// Build a configuration from `CLASSIFICATION_*` environment variables,
    /// falling back to defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            policy_api_url: env::var("CLASSIFICATION_POLICY_API_URL")
                .unwrap_or(defaults.policy_api_url),
            request_timeout_secs: env_or(
                "CLASSIFICATION_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            cache_duration_secs: env_or(
                "CLASSIFICATION_CACHE_DURATION_SECS",
                defaults.cache_duration_secs,
            ),
            cache_capacity: env_or("CLASSIFICATION_CACHE_CAPACITY", defaults.cache_capacity),
            default_page_size: env_or(
                "CLASSIFICATION_DEFAULT_PAGE_SIZE",
                defaults.default_page_size,
            ),
            max_condition_depth: env_or(
                "CLASSIFICATION_MAX_CONDITION_DEPTH",
                defaults.max_condition_depth,
            ),
            max_condition_nodes: defaults.max_condition_nodes,
        }
    }

    /// Set the remote base URL
    pub fn with_policy_api_url(mut self, url: impl Into<String>) -> Self {
        self.policy_api_url = url.into();
        self
    }

    /// Set the cache lifetime in seconds
    pub fn with_cache_duration_secs(mut self, secs: u64) -> Self {
        self.cache_duration_secs = secs;
        self
    }

    /// Set the cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the default page size
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Set the condition depth limit
    pub fn with_max_condition_depth(mut self, depth: usize) -> Self {
        self.max_condition_depth = depth;
        self
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Cache lifetime, `None` when entries never expire
    pub fn cache_ttl(&self) -> Option<Duration> {
        match self.cache_duration_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "Ignoring unparsable configuration value");
                default
            }
        },
        Err(_) => default,
    }
}

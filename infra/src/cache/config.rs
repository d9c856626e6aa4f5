//! Redis connection configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Redis storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,
    /// Prefix applied to every key written by this backend
    pub key_prefix: String,
    /// Maximum number of retry attempts for operations
    pub max_retries: u32,
    /// Base delay between retries in milliseconds (exponential backoff)
    pub retry_delay_ms: u64,
    /// Timeout for establishing a connection, in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-command timeout in milliseconds; elapsed commands surface as
    /// `StorageError::Unavailable`
    pub command_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: "keygate:".to_string(),
            max_retries: 3,
            retry_delay_ms: 100,
            connect_timeout_ms: 5000,
            command_timeout_ms: 2000,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration for the given URL with default retry
    /// settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            key_prefix: std::env::var("KEYGATE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            max_retries: std::env::var("REDIS_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            retry_delay_ms: std::env::var("REDIS_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_delay_ms),
            connect_timeout_ms: std::env::var("REDIS_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout_ms),
            command_timeout_ms: std::env::var("REDIS_COMMAND_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.command_timeout_ms),
        }
    }
}

//! # KeyGate Infrastructure
//!
//! Networked backends for the KeyGate authentication core. Provides the
//! Redis implementation of `kg_core`'s storage trait plus a factory
//! that selects between Redis and the in-memory fallback at startup.

use std::sync::Arc;

use tracing::{info, warn};

use kg_core::storage::{MemoryTokenStorage, TokenStorage};

pub mod cache;
pub mod storage;

pub use cache::{CacheConfig, RedisClient};
pub use storage::RedisTokenStorage;

/// Which backend a deployment ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process storage; state is lost on restart
    Memory,
    /// Shared Redis storage
    Redis,
}

/// Selects and connects a storage backend.
///
/// With a Redis URL, connects to Redis; if that connection cannot be
/// established the in-memory backend is used instead, with a warning,
/// so a cache outage at boot degrades availability of revocation data
/// rather than taking the service down. Without a URL the in-memory
/// backend is chosen directly.
pub async fn connect_storage(redis_url: Option<&str>) -> (Arc<dyn TokenStorage>, BackendKind) {
    match redis_url {
        Some(url) => {
            let config = CacheConfig::new(url);
            match RedisTokenStorage::new(&config).await {
                Ok(storage) => {
                    info!("using Redis token storage");
                    (Arc::new(storage), BackendKind::Redis)
                }
                Err(e) => {
                    warn!(
                        "Redis unavailable, falling back to in-memory token storage: {}",
                        e
                    );
                    (Arc::new(MemoryTokenStorage::new()), BackendKind::Memory)
                }
            }
        }
        None => {
            info!("using in-memory token storage");
            (Arc::new(MemoryTokenStorage::new()), BackendKind::Memory)
        }
    }
}

//! Periodic maintenance sweeps for revocation and CSRF records.
//!
//! The memory backend needs explicit sweeps; Redis expires records by TTL
//! and both sweeps become cheap no-ops there, so running the service
//! unconditionally is safe.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::errors::AuthResult;
use crate::storage::TokenStorage;

/// Configuration for the cleanup service
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
        }
    }
}

/// Result of a cleanup cycle
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired revocation records removed
    pub revocations_removed: usize,
    /// Number of expired CSRF records removed
    pub csrf_tokens_removed: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup completed without errors
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of records removed
    pub fn total_removed(&self) -> usize {
        self.revocations_removed + self.csrf_tokens_removed
    }
}

/// Service driving the storage sweeps on an interval
pub struct CleanupService<S: TokenStorage + 'static> {
    storage: Arc<S>,
    config: CleanupConfig,
}

impl<S: TokenStorage> CleanupService<S> {
    /// Creates a new cleanup service
    pub fn new(storage: Arc<S>, config: CleanupConfig) -> Self {
        Self { storage, config }
    }

    /// Runs a single cleanup cycle. Idempotent: a second run right after
    /// the first removes nothing and reports no errors.
    pub async fn run_cleanup(&self) -> AuthResult<CleanupResult> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let mut result = CleanupResult::default();

        match self.storage.clear_expired_revocations().await {
            Ok(count) => {
                result.revocations_removed = count;
            }
            Err(e) => {
                error!("failed to sweep expired revocations: {}", e);
                result.errors.push(format!("revocation sweep: {}", e));
            }
        }

        match self.storage.clear_old_csrf_tokens(None).await {
            Ok(count) => {
                result.csrf_tokens_removed = count;
            }
            Err(e) => {
                error!("failed to sweep expired CSRF tokens: {}", e);
                result.errors.push(format!("csrf sweep: {}", e));
            }
        }

        if result.total_removed() > 0 {
            info!(
                revocations = result.revocations_removed,
                csrf_tokens = result.csrf_tokens_removed,
                "cleanup cycle removed expired records"
            );
        }

        Ok(result)
    }

    /// Spawns the cleanup loop as a background task
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("cleanup service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "cleanup service started"
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) if !result.errors.is_empty() => {
                        warn!("cleanup completed with errors: {:?}", result.errors);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("cleanup cycle failed: {}", e);
                    }
                }
            }
        });
    }
}

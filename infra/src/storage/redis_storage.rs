//! Redis-backed implementation of the token storage trait.
//!
//! Revocation records and CSRF hashes are plain keys carrying the
//! protected token's remaining lifetime as their TTL, so Redis drops
//! them natively and the maintenance sweeps are no-ops here. Version
//! counters use INCR, which is atomic server-side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use kg_core::errors::StorageError;
use kg_core::storage::TokenStorage;

use crate::cache::{CacheConfig, RedisClient};

/// Token storage over a shared Redis instance.
///
/// All keys are namespaced under the configured prefix so several
/// deployments can share one Redis database.
#[derive(Clone)]
pub struct RedisTokenStorage {
    client: RedisClient,
    key_prefix: String,
}

impl RedisTokenStorage {
    /// Connects to Redis and returns a ready storage backend
    pub async fn new(config: &CacheConfig) -> Result<Self, StorageError> {
        let client = RedisClient::new(config).await?;
        Ok(Self {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Wraps an existing client, for sharing one connection across
    /// components
    pub fn with_client(client: RedisClient, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    /// Verifies connectivity with a PING
    pub async fn health_check(&self) -> Result<bool, StorageError> {
        self.client.health_check().await
    }

    /// Writes a marker key, bounded by the record's remaining lifetime
    /// when one is known
    async fn set_marker(
        &self,
        key: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        match expires_at.map(remaining_seconds) {
            // The protected token has already expired; nothing to record
            Some(None) => Ok(()),
            Some(Some(ttl)) => self.client.set_with_expiry(key, "1", ttl).await,
            None => self.client.set(key, "1").await,
        }
    }
}

#[async_trait]
impl TokenStorage for RedisTokenStorage {
    async fn add_revoked_token(
        &self,
        token_id: &str,
        user_id: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        self.set_marker(&revoked_key(&self.key_prefix, token_id), expires_at)
            .await?;

        if let Some(user_id) = user_id {
            self.set_marker(
                &user_revoked_key(&self.key_prefix, user_id, token_id),
                expires_at,
            )
            .await?;
        }

        Ok(())
    }

    async fn is_token_revoked(
        &self,
        token_id: &str,
        user_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        if self
            .client
            .exists(&revoked_key(&self.key_prefix, token_id))
            .await?
        {
            return Ok(true);
        }

        if let Some(user_id) = user_id {
            if self
                .client
                .exists(&user_revoked_key(&self.key_prefix, user_id, token_id))
                .await?
            {
                return Ok(true);
            }
            if self
                .client
                .exists(&revoke_all_key(&self.key_prefix, user_id))
                .await?
            {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn revoke_all_user_tokens(&self, user_id: &str) -> Result<(), StorageError> {
        self.client
            .set(
                &revoke_all_key(&self.key_prefix, user_id),
                &Utc::now().timestamp().to_string(),
            )
            .await
    }

    async fn get_user_token_version(&self, user_id: &str) -> Result<u64, StorageError> {
        match self
            .client
            .get(&version_key(&self.key_prefix, user_id))
            .await?
        {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| StorageError::backend(format!("corrupt version counter: {}", e))),
            None => Ok(0),
        }
    }

    async fn increment_user_token_version(&self, user_id: &str) -> Result<u64, StorageError> {
        let version = self
            .client
            .increment(&version_key(&self.key_prefix, user_id))
            .await?;
        Ok(version as u64)
    }

    async fn store_csrf_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let Some(ttl) = remaining_seconds(expires_at) else {
            // Already expired on arrival; verification would reject it
            // anyway, so there is nothing worth storing
            return Ok(());
        };

        self.client
            .set_with_expiry(&csrf_key(&self.key_prefix, user_id, token_hash), "1", ttl)
            .await
    }

    async fn verify_csrf_token(
        &self,
        user_id: &str,
        token_hash: &str,
    ) -> Result<bool, StorageError> {
        self.client
            .exists(&csrf_key(&self.key_prefix, user_id, token_hash))
            .await
    }

    async fn clear_old_csrf_tokens(&self, _user_id: Option<&str>) -> Result<usize, StorageError> {
        // Redis expires CSRF keys natively
        debug!("clear_old_csrf_tokens is a no-op on the Redis backend");
        Ok(0)
    }

    async fn clear_expired_revocations(&self) -> Result<usize, StorageError> {
        // Revocation records carry the token's own lifetime as their TTL
        debug!("clear_expired_revocations is a no-op on the Redis backend");
        Ok(0)
    }
}

/// Remaining lifetime in whole seconds, or `None` when already past
fn remaining_seconds(expires_at: DateTime<Utc>) -> Option<u64> {
    let remaining = (expires_at - Utc::now()).num_seconds();
    if remaining > 0 {
        Some(remaining as u64)
    } else {
        None
    }
}

fn revoked_key(prefix: &str, token_id: &str) -> String {
    format!("{}revoked:{}", prefix, token_id)
}

fn user_revoked_key(prefix: &str, user_id: &str, token_id: &str) -> String {
    format!("{}revoked:user:{}:{}", prefix, user_id, token_id)
}

fn revoke_all_key(prefix: &str, user_id: &str) -> String {
    format!("{}revoked_all:{}", prefix, user_id)
}

fn version_key(prefix: &str, user_id: &str) -> String {
    format!("{}version:{}", prefix, user_id)
}

fn csrf_key(prefix: &str, user_id: &str, token_hash: &str) -> String {
    format!("{}csrf:{}:{}", prefix, user_id, token_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_key_formats() {
        assert_eq!(revoked_key("keygate:", "tok"), "keygate:revoked:tok");
        assert_eq!(
            user_revoked_key("keygate:", "u1", "tok"),
            "keygate:revoked:user:u1:tok"
        );
        assert_eq!(revoke_all_key("keygate:", "u1"), "keygate:revoked_all:u1");
        assert_eq!(version_key("keygate:", "u1"), "keygate:version:u1");
        assert_eq!(csrf_key("keygate:", "u1", "abc"), "keygate:csrf:u1:abc");
    }

    #[test]
    fn test_remaining_seconds() {
        assert!(remaining_seconds(Utc::now() + Duration::hours(1)).is_some());
        assert_eq!(remaining_seconds(Utc::now() - Duration::seconds(5)), None);
    }
}

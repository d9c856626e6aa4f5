//! Storage capability trait for revocation, versioning, and CSRF records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::errors::StorageError;

/// Capability interface implemented identically by every backend.
///
/// The behavioral contract is backend-independent: the in-memory backend
/// guards shared state with a lock and sweeps explicitly, the networked
/// backend relies on native TTL expiry and atomic counters. The lifecycle
/// and CSRF engines hold no persisted state themselves; everything durable
/// lives behind this trait.
///
/// # Failure semantics
/// Connectivity failures must surface as [`StorageError::Unavailable`]
/// rather than a success value. Callers treat that as a verification
/// failure (fail-closed); a storage outage is never "not revoked".
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Marks a token ID as revoked.
    ///
    /// The token is always added to the global revoked set; when `user_id`
    /// is given it is additionally scoped under that principal. The
    /// optional `expires_at` carries the token's own expiry so backends
    /// can drop the record once it no longer protects anything.
    async fn add_revoked_token(
        &self,
        token_id: &str,
        user_id: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError>;

    /// Returns true if the token ID is globally revoked, or, when
    /// `user_id` is given, if it was revoked under that principal or the
    /// principal carries a revoke-all marker.
    async fn is_token_revoked(
        &self,
        token_id: &str,
        user_id: Option<&str>,
    ) -> Result<bool, StorageError>;

    /// Sets a marker considering every token issued before this call
    /// revoked for the principal, when queried with that principal ID.
    ///
    /// The marker is coarse by design: it covers arbitrary token IDs the
    /// backend has never seen. Tokens issued after the accompanying
    /// version bump are discriminated by the lifecycle engine through the
    /// version embedded in their claims, not through this marker.
    async fn revoke_all_user_tokens(&self, user_id: &str) -> Result<(), StorageError>;

    /// Returns the principal's current token version; 0 for unseen
    /// principals.
    async fn get_user_token_version(&self, user_id: &str) -> Result<u64, StorageError>;

    /// Atomically bumps and returns the principal's token version.
    ///
    /// Must be linearizable per principal: concurrent bumps for the same
    /// principal must not lose an increment.
    async fn increment_user_token_version(&self, user_id: &str) -> Result<u64, StorageError>;

    /// Stores a CSRF token hash for the principal. The raw token is never
    /// persisted.
    async fn store_csrf_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Returns true only if a matching, unexpired CSRF record exists for
    /// the principal.
    async fn verify_csrf_token(&self, user_id: &str, token_hash: &str)
        -> Result<bool, StorageError>;

    /// Removes expired CSRF records for one principal, or for all when
    /// `user_id` is `None`. Safe to call at any time; a no-op if nothing
    /// expired.
    async fn clear_old_csrf_tokens(&self, user_id: Option<&str>) -> Result<usize, StorageError>;

    /// Removes revocation records whose protected token has expired.
    /// Backends with native TTL expiry return 0 without doing work.
    async fn clear_expired_revocations(&self) -> Result<usize, StorageError>;
}

#[async_trait]
impl<T> TokenStorage for Arc<T>
where
    T: TokenStorage + ?Sized,
{
    async fn add_revoked_token(
        &self,
        token_id: &str,
        user_id: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        (**self).add_revoked_token(token_id, user_id, expires_at).await
    }

    async fn is_token_revoked(
        &self,
        token_id: &str,
        user_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        (**self).is_token_revoked(token_id, user_id).await
    }

    async fn revoke_all_user_tokens(&self, user_id: &str) -> Result<(), StorageError> {
        (**self).revoke_all_user_tokens(user_id).await
    }

    async fn get_user_token_version(&self, user_id: &str) -> Result<u64, StorageError> {
        (**self).get_user_token_version(user_id).await
    }

    async fn increment_user_token_version(&self, user_id: &str) -> Result<u64, StorageError> {
        (**self).increment_user_token_version(user_id).await
    }

    async fn store_csrf_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        (**self).store_csrf_token(user_id, token_hash, expires_at).await
    }

    async fn verify_csrf_token(
        &self,
        user_id: &str,
        token_hash: &str,
    ) -> Result<bool, StorageError> {
        (**self).verify_csrf_token(user_id, token_hash).await
    }

    async fn clear_old_csrf_tokens(&self, user_id: Option<&str>) -> Result<usize, StorageError> {
        (**self).clear_old_csrf_tokens(user_id).await
    }

    async fn clear_expired_revocations(&self) -> Result<usize, StorageError> {
        (**self).clear_expired_revocations().await
    }
}

//! CSRF token generation and verification.

use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::errors::AuthResult;
use crate::storage::TokenStorage;

/// Default CSRF token lifetime (1 hour)
pub const DEFAULT_CSRF_MAX_AGE_HOURS: i64 = 1;

/// Number of random bytes behind each token
const CSRF_TOKEN_BYTES: usize = 32;

/// Anti-forgery token engine, independent of the bearer-token flow.
///
/// Only the SHA-256 hash of a token is persisted; the raw value is handed
/// to the client once and never stored. Tokens are reusable until expiry;
/// they are not consumed on verification.
pub struct CsrfService<S: TokenStorage> {
    storage: S,
    default_max_age: Duration,
}

impl<S: TokenStorage> CsrfService<S> {
    /// Creates a CSRF service with the default token lifetime
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            default_max_age: Duration::hours(DEFAULT_CSRF_MAX_AGE_HOURS),
        }
    }

    /// Creates a CSRF service with a custom default token lifetime
    pub fn with_max_age(storage: S, max_age: Duration) -> Self {
        Self {
            storage,
            default_max_age: max_age,
        }
    }

    /// Generates a token for the principal using the default lifetime
    pub async fn generate(&self, user_id: &str) -> AuthResult<String> {
        self.generate_with_max_age(user_id, self.default_max_age).await
    }

    /// Generates a high-entropy token, stores its hash, and returns the
    /// raw token for the client
    pub async fn generate_with_max_age(
        &self,
        user_id: &str,
        max_age: Duration,
    ) -> AuthResult<String> {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let expires_at = Utc::now() + max_age;
        self.storage
            .store_csrf_token(user_id, &hash_token(&token), expires_at)
            .await?;

        debug!(principal = %user_id, %expires_at, "generated CSRF token");

        Ok(token)
    }

    /// Verifies a token for the principal: true only if a matching,
    /// unexpired record exists
    pub async fn verify(&self, user_id: &str, token: &str) -> AuthResult<bool> {
        let hash = hash_token(token);
        Ok(self.storage.verify_csrf_token(user_id, &hash).await?)
    }

    /// Removes the principal's expired records
    pub async fn clear_old(&self, user_id: &str) -> AuthResult<usize> {
        Ok(self.storage.clear_old_csrf_tokens(Some(user_id)).await?)
    }
}

/// Hashes a raw CSRF token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

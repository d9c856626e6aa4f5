//! In-process storage backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::StorageError;

use super::r#trait::TokenStorage;

/// A stored CSRF token record
#[derive(Debug, Clone)]
struct CsrfRecord {
    token_hash: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Globally revoked token IDs, with the protected token's expiry when
    /// known so the sweep can drop stale records
    revoked: HashMap<String, Option<DateTime<Utc>>>,
    /// Token IDs revoked under a specific principal
    revoked_by_user: HashMap<String, HashSet<String>>,
    /// Principals with a revoke-all marker, keyed to when it was set
    revoke_all_markers: HashMap<String, DateTime<Utc>>,
    /// Per-principal token version counters
    versions: HashMap<String, u64>,
    /// CSRF records per principal
    csrf_tokens: HashMap<String, Vec<CsrfRecord>>,
}

/// Single-process storage backend.
///
/// All shared state sits behind one `RwLock`; every operation acquires the
/// lock exactly once, which makes each operation atomic under concurrent
/// callers and keeps version increments linearizable per principal.
#[derive(Clone, Default)]
pub struct MemoryTokenStorage {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryTokenStorage {
    /// Creates an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn add_revoked_token(
        &self,
        token_id: &str,
        user_id: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;

        state.revoked.insert(token_id.to_string(), expires_at);
        if let Some(user) = user_id {
            state
                .revoked_by_user
                .entry(user.to_string())
                .or_default()
                .insert(token_id.to_string());
        }

        Ok(())
    }

    async fn is_token_revoked(
        &self,
        token_id: &str,
        user_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        let state = self.state.read().await;

        if state.revoked.contains_key(token_id) {
            return Ok(true);
        }

        if let Some(user) = user_id {
            if state.revoke_all_markers.contains_key(user) {
                return Ok(true);
            }
            if let Some(tokens) = state.revoked_by_user.get(user) {
                if tokens.contains(token_id) {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    async fn revoke_all_user_tokens(&self, user_id: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        state
            .revoke_all_markers
            .insert(user_id.to_string(), Utc::now());
        Ok(())
    }

    async fn get_user_token_version(&self, user_id: &str) -> Result<u64, StorageError> {
        let state = self.state.read().await;
        Ok(state.versions.get(user_id).copied().unwrap_or(0))
    }

    async fn increment_user_token_version(&self, user_id: &str) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let version = state.versions.entry(user_id.to_string()).or_insert(0);
        *version += 1;
        Ok(*version)
    }

    async fn store_csrf_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        state
            .csrf_tokens
            .entry(user_id.to_string())
            .or_default()
            .push(CsrfRecord {
                token_hash: token_hash.to_string(),
                expires_at,
            });
        Ok(())
    }

    async fn verify_csrf_token(
        &self,
        user_id: &str,
        token_hash: &str,
    ) -> Result<bool, StorageError> {
        let state = self.state.read().await;
        let now = Utc::now();

        let Some(records) = state.csrf_tokens.get(user_id) else {
            return Ok(false);
        };

        // Constant-time hash comparison; expiry is checked against the
        // clock at verification time.
        let mut matched = false;
        for record in records {
            if constant_time_eq(record.token_hash.as_bytes(), token_hash.as_bytes())
                && record.expires_at > now
            {
                matched = true;
            }
        }

        Ok(matched)
    }

    async fn clear_old_csrf_tokens(&self, user_id: Option<&str>) -> Result<usize, StorageError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut removed = 0;

        match user_id {
            Some(user) => {
                if let Some(records) = state.csrf_tokens.get_mut(user) {
                    let before = records.len();
                    records.retain(|r| r.expires_at > now);
                    removed = before - records.len();
                }
            }
            None => {
                for records in state.csrf_tokens.values_mut() {
                    let before = records.len();
                    records.retain(|r| r.expires_at > now);
                    removed += before - records.len();
                }
            }
        }

        state.csrf_tokens.retain(|_, records| !records.is_empty());

        Ok(removed)
    }

    async fn clear_expired_revocations(&self) -> Result<usize, StorageError> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let before = state.revoked.len();
        // Records without a known expiry are kept; there is nothing safe
        // to compare them against.
        state
            .revoked
            .retain(|_, expires_at| expires_at.map_or(true, |exp| exp > now));
        let removed = before - state.revoked.len();

        let revoked = state.revoked.clone();
        for tokens in state.revoked_by_user.values_mut() {
            tokens.retain(|t| revoked.contains_key(t));
        }
        state.revoked_by_user.retain(|_, tokens| !tokens.is_empty());

        Ok(removed)
    }
}

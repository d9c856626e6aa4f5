//! Unit tests for the in-memory storage backend

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::storage::{MemoryTokenStorage, TokenStorage};

#[tokio::test]
async fn test_revoked_token_tracking() {
    let storage = MemoryTokenStorage::new();

    storage
        .add_revoked_token("token1", None, None)
        .await
        .unwrap();

    assert!(storage.is_token_revoked("token1", None).await.unwrap());
    assert!(!storage.is_token_revoked("token2", None).await.unwrap());
}

#[tokio::test]
async fn test_user_specific_revocation() {
    let storage = MemoryTokenStorage::new();

    storage
        .add_revoked_token("token1", Some("user1"), None)
        .await
        .unwrap();

    // Revoked both globally and under the user
    assert!(storage.is_token_revoked("token1", None).await.unwrap());
    assert!(storage
        .is_token_revoked("token1", Some("user1"))
        .await
        .unwrap());

    assert!(!storage
        .is_token_revoked("token2", Some("user1"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_revoke_all_user_tokens() {
    let storage = MemoryTokenStorage::new();

    storage
        .add_revoked_token("token1", Some("user1"), None)
        .await
        .unwrap();
    storage.revoke_all_user_tokens("user1").await.unwrap();

    // The marker covers token IDs never explicitly added
    assert!(storage
        .is_token_revoked("different_token", Some("user1"))
        .await
        .unwrap());

    // But not for another principal
    assert!(!storage
        .is_token_revoked("different_token", Some("user2"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_token_versioning() {
    let storage = MemoryTokenStorage::new();

    assert_eq!(storage.get_user_token_version("user1").await.unwrap(), 0);

    assert_eq!(
        storage.increment_user_token_version("user1").await.unwrap(),
        1
    );
    assert_eq!(storage.get_user_token_version("user1").await.unwrap(), 1);

    assert_eq!(
        storage.increment_user_token_version("user1").await.unwrap(),
        2
    );
    assert_eq!(storage.get_user_token_version("user1").await.unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_version_increments_lose_nothing() {
    let storage = Arc::new(MemoryTokenStorage::new());

    let mut handles = Vec::new();
    for _ in 0..20 {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage.increment_user_token_version("user1").await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(storage.get_user_token_version("user1").await.unwrap(), 20);
}

#[tokio::test]
async fn test_csrf_token_storage() {
    let storage = MemoryTokenStorage::new();
    let expires_at = Utc::now() + Duration::hours(1);

    storage
        .store_csrf_token("user1", "hash123", expires_at)
        .await
        .unwrap();

    assert!(storage.verify_csrf_token("user1", "hash123").await.unwrap());
    assert!(!storage
        .verify_csrf_token("user1", "wrong_hash")
        .await
        .unwrap());
    assert!(!storage
        .verify_csrf_token("wrong_user", "hash123")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_csrf_token_expiration() {
    let storage = MemoryTokenStorage::new();
    let expired_at = Utc::now() - Duration::hours(1);

    storage
        .store_csrf_token("user1", "hash123", expired_at)
        .await
        .unwrap();

    assert!(!storage.verify_csrf_token("user1", "hash123").await.unwrap());
}

#[tokio::test]
async fn test_clear_old_csrf_tokens() {
    let storage = MemoryTokenStorage::new();

    storage
        .store_csrf_token("user1", "expired_hash", Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    storage
        .store_csrf_token("user1", "valid_hash", Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    let removed = storage.clear_old_csrf_tokens(Some("user1")).await.unwrap();
    assert_eq!(removed, 1);

    assert!(!storage
        .verify_csrf_token("user1", "expired_hash")
        .await
        .unwrap());
    assert!(storage
        .verify_csrf_token("user1", "valid_hash")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_csrf_sweep_is_idempotent() {
    let storage = MemoryTokenStorage::new();

    storage
        .store_csrf_token("user1", "expired_hash", Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(storage.clear_old_csrf_tokens(None).await.unwrap(), 1);
    assert_eq!(storage.clear_old_csrf_tokens(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_clear_expired_revocations() {
    let storage = MemoryTokenStorage::new();

    storage
        .add_revoked_token("stale", Some("user1"), Some(Utc::now() - Duration::minutes(5)))
        .await
        .unwrap();
    storage
        .add_revoked_token("live", None, Some(Utc::now() + Duration::minutes(5)))
        .await
        .unwrap();
    storage
        .add_revoked_token("unbounded", None, None)
        .await
        .unwrap();

    let removed = storage.clear_expired_revocations().await.unwrap();
    assert_eq!(removed, 1);

    assert!(!storage.is_token_revoked("stale", None).await.unwrap());
    assert!(!storage
        .is_token_revoked("stale", Some("user1"))
        .await
        .unwrap());
    assert!(storage.is_token_revoked("live", None).await.unwrap());
    // Records with no known expiry are never swept
    assert!(storage.is_token_revoked("unbounded", None).await.unwrap());

    // Second sweep is a no-op
    assert_eq!(storage.clear_expired_revocations().await.unwrap(), 0);
}

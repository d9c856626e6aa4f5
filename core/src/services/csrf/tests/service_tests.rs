//! Unit tests for the CSRF token service

use chrono::Duration;

use crate::services::csrf::CsrfService;
use crate::storage::MemoryTokenStorage;

fn create_test_service() -> CsrfService<MemoryTokenStorage> {
    CsrfService::new(MemoryTokenStorage::new())
}

#[tokio::test]
async fn test_generate_and_verify() {
    let service = create_test_service();

    let token = service.generate("u1").await.unwrap();

    assert!(service.verify("u1", &token).await.unwrap());
    assert!(!service.verify("u1", "wrong_token").await.unwrap());
    assert!(!service.verify("other_user", &token).await.unwrap());
}

#[tokio::test]
async fn test_mutated_token_fails() {
    let service = create_test_service();

    let token = service.generate("u1").await.unwrap();
    let mut mutated = token.clone();
    let last = mutated.pop().unwrap();
    mutated.push(if last == 'a' { 'b' } else { 'a' });

    assert!(!service.verify("u1", &mutated).await.unwrap());
}

#[tokio::test]
async fn test_tokens_are_unique() {
    let service = create_test_service();

    let first = service.generate("u1").await.unwrap();
    let second = service.generate("u1").await.unwrap();

    assert_ne!(first, second);
    // Both remain valid: reusable until expiry, not consumed on verify
    assert!(service.verify("u1", &first).await.unwrap());
    assert!(service.verify("u1", &first).await.unwrap());
    assert!(service.verify("u1", &second).await.unwrap());
}

#[tokio::test]
async fn test_expired_token_fails() {
    let service = create_test_service();

    let token = service
        .generate_with_max_age("u1", Duration::hours(-1))
        .await
        .unwrap();

    assert!(!service.verify("u1", &token).await.unwrap());
}

#[tokio::test]
async fn test_clear_old_is_idempotent() {
    let service = create_test_service();

    service
        .generate_with_max_age("u1", Duration::hours(-1))
        .await
        .unwrap();
    let valid = service.generate("u1").await.unwrap();

    assert_eq!(service.clear_old("u1").await.unwrap(), 1);
    assert_eq!(service.clear_old("u1").await.unwrap(), 0);

    assert!(service.verify("u1", &valid).await.unwrap());
}

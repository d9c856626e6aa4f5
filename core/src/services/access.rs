//! Access guards over verified tokens.
//!
//! Thin helpers host applications call at their request boundary, keeping
//! the missing-credentials and insufficient-role signals distinct.

use crate::domain::entities::token::TokenData;
use crate::errors::{AuthError, AuthResult};
use crate::storage::TokenStorage;

use super::token::TokenService;

/// Verifies the bearer token attached to a request.
///
/// A missing token is `NotAuthenticated`; a present but invalid one fails
/// with whatever `verify_token` decides, so callers can map the two to
/// different status codes.
pub async fn require_auth<S: TokenStorage>(
    service: &TokenService<S>,
    bearer_token: Option<&str>,
) -> AuthResult<TokenData> {
    let token = bearer_token.ok_or(AuthError::NotAuthenticated)?;
    service.verify_token(token).await
}

/// Requires the verified principal to hold at least one of the given
/// roles. An empty requirement always passes.
pub fn require_roles(data: &TokenData, required: &[&str]) -> AuthResult<()> {
    if required.is_empty() || required.iter().any(|role| data.has_role(role)) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::principal::Principal;
    use crate::services::token::{TokenService, TokenServiceConfig};
    use crate::storage::MemoryTokenStorage;

    fn create_service() -> TokenService<MemoryTokenStorage> {
        TokenService::new(MemoryTokenStorage::new(), TokenServiceConfig::default())
    }

    #[tokio::test]
    async fn test_missing_bearer_is_not_authenticated() {
        let service = create_service();

        let result = require_auth(&service, None).await;
        assert_eq!(result.unwrap_err(), AuthError::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_invalid_bearer_is_authentication_failed() {
        let service = create_service();

        let result = require_auth(&service, Some("not.a.token")).await;
        assert_eq!(result.unwrap_err(), AuthError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn test_valid_bearer_yields_token_data() {
        let service = create_service();
        let principal = Principal::new("u1", vec!["admin".to_string()]);
        let pair = service.issue_tokens(&principal).await.unwrap();

        let data = require_auth(&service, Some(&pair.access_token))
            .await
            .unwrap();
        assert_eq!(data.user_id, "u1");
        assert!(data.has_role("admin"));
    }

    #[test]
    fn test_require_roles() {
        let data = TokenData {
            user_id: "u1".to_string(),
            roles: vec!["user".to_string()],
        };

        assert!(require_roles(&data, &[]).is_ok());
        assert!(require_roles(&data, &["user"]).is_ok());
        assert!(require_roles(&data, &["admin", "user"]).is_ok());
        assert_eq!(
            require_roles(&data, &["admin"]).unwrap_err(),
            AuthError::InsufficientPermissions
        );
    }

    #[test]
    fn test_require_roles_with_no_roles_at_all() {
        let data = TokenData {
            user_id: "u1".to_string(),
            roles: vec![],
        };

        assert!(require_roles(&data, &[]).is_ok());
        assert_eq!(
            require_roles(&data, &["user"]).unwrap_err(),
            AuthError::InsufficientPermissions
        );
    }
}

//! Configuration for the token service

use jsonwebtoken::Algorithm;

use crate::domain::entities::token::{ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS};

/// Configuration for the token service.
///
/// Constructed once by the host application and handed to
/// [`TokenService::new`](super::TokenService::new); treated as read-only
/// afterwards. Signing uses the HMAC family (HS256 by default) over the
/// shared secret.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Signing secret
    pub secret: String,
    /// Signing algorithm
    pub algorithm: Algorithm,
    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,
    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,
}

impl TokenServiceConfig {
    /// Creates a configuration with the given secret and default HS256
    /// algorithm and expirations
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_token_expiry_minutes: ACCESS_TOKEN_EXPIRY_MINUTES,
            refresh_token_expiry_days: REFRESH_TOKEN_EXPIRY_DAYS,
        }
    }
}

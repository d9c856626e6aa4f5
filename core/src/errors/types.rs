//! Error type definitions for token verification, storage, and access control.
//!
//! Verification failures are collapsed to a generic `AuthenticationFailed`
//! signal before they reach the caller so that failure reasons are not
//! leaked. Version mismatches and storage outages stay distinguishable:
//! the former is rotation-caused and not security-sensitive, the latter
//! must be alertable separately from genuine auth failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Codec- and lifecycle-level token errors.
///
/// These stay internal to the engine; callers see the collapsed
/// [`AuthError`] variants instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Token version is outdated")]
    VersionOutdated,

    #[error("Invalid token type")]
    InvalidTokenType,

    #[error("Token does not match user")]
    TokenUserMismatch,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Missing required claim: {claim}")]
    MissingClaim { claim: String },
}

/// Storage backend errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend unreachable or timed out. Verification treats this as a
    /// failure (fail-closed), never as "not revoked".
    #[error("Storage backend unavailable: {message}")]
    Unavailable { message: String },

    /// Backend reachable but the operation failed
    #[error("Storage backend error: {message}")]
    Backend { message: String },
}

impl StorageError {
    /// Shorthand for a connectivity/timeout failure
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Shorthand for a non-connectivity backend failure
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Externally visible authentication errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Generic collapse of malformed/expired/bad-signature/revoked
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rotation occurred since issuance; client must re-authenticate
    #[error("Token version is outdated")]
    VersionOutdated,

    /// Refresh token subject does not match the supplied principal
    #[error("Token does not match user")]
    TokenUserMismatch,

    /// No credentials were attached to the request
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Authenticated but lacking every required role
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// CSRF token missing, expired, or not matching
    #[error("CSRF validation failed")]
    CsrfValidationFailed,

    /// Backend unreachable; surfaced distinctly so operators can alert
    /// on outages separately from genuine auth failures
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Collapses fine-grained token errors into the external signal set.
impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::VersionOutdated => AuthError::VersionOutdated,
            TokenError::TokenUserMismatch => AuthError::TokenUserMismatch,
            _ => AuthError::AuthenticationFailed,
        }
    }
}

/// Result alias used across the engine surface
pub type AuthResult<T> = Result<T, AuthError>;

/// Unified error response structure for host applications
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        let error_code = match err {
            AuthError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            AuthError::VersionOutdated => "TOKEN_VERSION_OUTDATED",
            AuthError::TokenUserMismatch => "TOKEN_USER_MISMATCH",
            AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
            AuthError::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            AuthError::CsrfValidationFailed => "CSRF_VALIDATION_FAILED",
            AuthError::Storage(StorageError::Unavailable { .. }) => "STORAGE_UNAVAILABLE",
            AuthError::Storage(StorageError::Backend { .. }) => "STORAGE_ERROR",
        };

        ErrorResponse::new(error_code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_errors_collapse_to_generic_failure() {
        for err in [
            TokenError::MalformedToken,
            TokenError::InvalidSignature,
            TokenError::TokenExpired,
            TokenError::TokenRevoked,
        ] {
            assert_eq!(AuthError::from(err), AuthError::AuthenticationFailed);
        }
    }

    #[test]
    fn test_version_mismatch_stays_distinguishable() {
        let err = AuthError::from(TokenError::VersionOutdated);
        assert_eq!(err, AuthError::VersionOutdated);
        assert_eq!(err.to_string(), "Token version is outdated");
    }

    #[test]
    fn test_storage_unavailable_response_code() {
        let err = AuthError::Storage(StorageError::unavailable("connection refused"));
        let response = ErrorResponse::from(&err);

        assert_eq!(response.error, "STORAGE_UNAVAILABLE");
        assert!(response.message.contains("connection refused"));
    }

    #[test]
    fn test_auth_and_permission_errors_are_distinct() {
        let unauthenticated = ErrorResponse::from(&AuthError::NotAuthenticated);
        let forbidden = ErrorResponse::from(&AuthError::InsufficientPermissions);

        assert_ne!(unauthenticated.error, forbidden.error);
    }
}

//! Token entities for signed bearer authentication.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::principal::Principal;

/// Default access token expiration time (30 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 30;

/// Default refresh token expiration time (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Token type tag returned with every issued pair
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// Discriminates access tokens from refresh tokens inside the claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token authorizing API calls, carries roles
    Access,
    /// Longer-lived token used only to mint new pairs
    Refresh,
}

/// Claims structure for the signed token payload.
///
/// The per-principal token version is pinned into the claims at issuance
/// (`ver`), so verification compares it against the stored counter without
/// re-deriving issuance state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Token kind: access or refresh
    #[serde(rename = "type")]
    pub kind: TokenKind,

    /// Role memberships; present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    /// Principal token version at issuance
    pub ver: u64,
}

impl Claims {
    /// Creates claims for an access token
    pub fn new_access(principal: &Principal, expiry_minutes: i64, version: u64) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::minutes(expiry_minutes);

        Self {
            sub: principal.id.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            kind: TokenKind::Access,
            roles: Some(principal.roles.clone()),
            ver: version,
        }
    }

    /// Creates claims for a refresh token; carries no roles
    pub fn new_refresh(principal_id: &str, expiry_days: i64, version: u64) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::days(expiry_days);

        Self {
            sub: principal_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            kind: TokenKind::Refresh,
            roles: None,
            ver: version,
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Token pair returned to the client by issuance, refresh, and rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Signed refresh token
    pub refresh_token: String,

    /// Always `"bearer"`
    pub token_type: String,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }
}

/// Normalized verification result handed back to the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    /// Principal ID extracted from the token subject
    pub user_id: String,

    /// Role memberships; empty for tokens that carry none
    pub roles: Vec<String>,
}

impl TokenData {
    /// Checks whether the verified token carries the given role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

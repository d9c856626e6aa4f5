//! Main token lifecycle service implementation

use chrono::{Duration, TimeZone, Utc};
use tracing::{debug, warn};

use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{Claims, TokenData, TokenKind, TokenPair};
use crate::errors::{AuthError, AuthResult, TokenError};
use crate::storage::TokenStorage;

use super::codec::JwtCodec;
use super::config::TokenServiceConfig;

/// Service orchestrating token issuance, verification, refresh, rotation,
/// and revocation.
///
/// The service itself is stateless: token state is inferred at
/// verification time from the codec (signature, expiry) and the storage
/// backend (revocation records, version counters). Configuration is fixed
/// at construction and read-only afterwards, so the service is safe to
/// share across concurrent callers.
pub struct TokenService<S: TokenStorage> {
    storage: S,
    config: TokenServiceConfig,
    codec: JwtCodec,
}

impl<S: TokenStorage> TokenService<S> {
    /// Creates a new token service over the given storage backend
    pub fn new(storage: S, config: TokenServiceConfig) -> Self {
        let codec = JwtCodec::new(&config.secret, config.algorithm);
        Self {
            storage,
            config,
            codec,
        }
    }

    /// Access to the underlying storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Issues a fresh access/refresh pair for the principal.
    ///
    /// The principal's current token version is pinned into both sets of
    /// claims, so a later rotation invalidates the pair in O(1) without
    /// enumerating outstanding tokens.
    pub async fn issue_tokens(&self, principal: &Principal) -> AuthResult<TokenPair> {
        let version = self.storage.get_user_token_version(&principal.id).await?;

        let access_claims = Claims::new_access(
            principal,
            self.config.access_token_expiry_minutes,
            version,
        );
        let refresh_claims = Claims::new_refresh(
            &principal.id,
            self.config.refresh_token_expiry_days,
            version,
        );

        let access_token = self.codec.encode(&access_claims).map_err(AuthError::from)?;
        let refresh_token = self.codec.encode(&refresh_claims).map_err(AuthError::from)?;

        debug!(principal = %principal.id, version, "issued token pair");

        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Verifies a token and returns the normalized token data.
    ///
    /// Check order: codec (signature, expiry) first, since the principal
    /// ID needed for storage lookups only exists after a successful
    /// decode; then the revocation record; then the version counter.
    /// Storage outages propagate as a distinct failure instead of being
    /// coerced to "not revoked".
    pub async fn verify_token(&self, token: &str) -> AuthResult<TokenData> {
        let claims = self.decode_logged(token)?;

        if self.storage.is_token_revoked(token, None).await? {
            debug!(principal = %claims.sub, "rejected revoked token");
            return Err(AuthError::from(TokenError::TokenRevoked));
        }

        let current = self.storage.get_user_token_version(&claims.sub).await?;
        if claims.ver != current {
            debug!(
                principal = %claims.sub,
                token_version = claims.ver,
                current_version = current,
                "rejected token with outdated version"
            );
            return Err(AuthError::VersionOutdated);
        }

        Ok(TokenData {
            user_id: claims.sub,
            roles: claims.roles.unwrap_or_default(),
        })
    }

    /// Mints a new pair from a refresh token.
    ///
    /// The refresh token must decode, be of refresh kind, belong to the
    /// supplied principal, and still pass the revocation and version
    /// checks. The new pair is freshly encoded, so it differs from the
    /// one being refreshed even within the same instant.
    pub async fn refresh_tokens(
        &self,
        refresh_token: &str,
        principal: &Principal,
    ) -> AuthResult<TokenPair> {
        let claims = self.decode_logged(refresh_token)?;

        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::from(TokenError::InvalidTokenType));
        }

        if claims.sub != principal.id {
            warn!(
                token_subject = %claims.sub,
                principal = %principal.id,
                "refresh token subject mismatch"
            );
            return Err(AuthError::TokenUserMismatch);
        }

        if self.storage.is_token_revoked(refresh_token, None).await? {
            return Err(AuthError::from(TokenError::TokenRevoked));
        }

        let current = self.storage.get_user_token_version(&claims.sub).await?;
        if claims.ver != current {
            return Err(AuthError::VersionOutdated);
        }

        self.issue_tokens(principal).await
    }

    /// Revokes a single token; subsequent verification of this exact
    /// string fails for the rest of its validity window.
    ///
    /// When the signature verifies (expiry aside), the record is scoped
    /// under the token's subject and carries its real expiry so the
    /// backend can drop it once it protects nothing. Undecodable input
    /// is recorded globally with a lifetime of one refresh window, the
    /// longest any token it could stand for stays valid.
    pub async fn revoke_token(&self, token: &str) -> AuthResult<()> {
        match self.codec.decode_ignoring_expiry(token) {
            Ok(claims) => {
                let expires_at = Utc.timestamp_opt(claims.exp, 0).single();
                self.storage
                    .add_revoked_token(token, Some(&claims.sub), expires_at)
                    .await?;
                debug!(principal = %claims.sub, "revoked token");
            }
            Err(_) => {
                let expires_at =
                    Utc::now() + Duration::days(self.config.refresh_token_expiry_days);
                self.storage
                    .add_revoked_token(token, None, Some(expires_at))
                    .await?;
            }
        }
        Ok(())
    }

    /// Revokes every outstanding token for the principal and returns the
    /// new token version.
    ///
    /// Two coordinated mechanisms: the revoke-all marker covers queries
    /// for arbitrary token IDs under the principal, and the version bump
    /// makes every embedded-version check fail for tokens issued before
    /// this call. Pairs issued afterwards pick up the new version and
    /// verify normally.
    pub async fn revoke_all_user_tokens(&self, user_id: &str) -> AuthResult<u64> {
        self.storage.revoke_all_user_tokens(user_id).await?;
        let version = self.storage.increment_user_token_version(user_id).await?;

        debug!(principal = %user_id, version, "revoked all tokens");

        Ok(version)
    }

    /// Rotates the principal's tokens: revokes everything outstanding and
    /// returns a fresh pair that passes the new version check.
    pub async fn rotate_user_tokens(&self, principal: &Principal) -> AuthResult<TokenPair> {
        self.revoke_all_user_tokens(&principal.id).await?;
        self.issue_tokens(principal).await
    }

    /// Reports whether a token is revoked.
    ///
    /// Without an explicit principal the subject is taken from the token
    /// itself when it decodes, and a stale embedded version counts as
    /// revoked; this keeps the answer consistent with what verification
    /// would decide after a rotation.
    pub async fn is_token_revoked(
        &self,
        token: &str,
        user_id: Option<&str>,
    ) -> AuthResult<bool> {
        if self.storage.is_token_revoked(token, user_id).await? {
            return Ok(true);
        }

        if user_id.is_none() {
            if let Ok(claims) = self.codec.decode(token) {
                if self
                    .storage
                    .is_token_revoked(token, Some(&claims.sub))
                    .await?
                {
                    return Ok(true);
                }
                let current = self.storage.get_user_token_version(&claims.sub).await?;
                if claims.ver != current {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// Maintenance sweep for revocation records whose protected token has
    /// expired. A no-op on backends that auto-expire.
    pub async fn clear_expired_revocations(&self) -> AuthResult<usize> {
        Ok(self.storage.clear_expired_revocations().await?)
    }

    /// Decodes a token, logging signature failures as security-relevant
    /// before collapsing the error for the caller.
    fn decode_logged(&self, token: &str) -> AuthResult<Claims> {
        self.codec.decode(token).map_err(|e| {
            if e == TokenError::InvalidSignature {
                warn!("token signature verification failed");
            }
            AuthError::from(e)
        })
    }
}

//! Framework-independent CSRF request guard.

use tracing::debug;

use crate::errors::{AuthError, AuthResult};
use crate::storage::TokenStorage;

use super::service::CsrfService;

/// HTTP methods that never mutate state and always bypass the check
pub const SAFE_METHODS: [&str; 4] = ["GET", "HEAD", "OPTIONS", "TRACE"];

/// Conventional header carrying the CSRF token
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Minimal view of an incoming request, implemented by the host
/// application over its web framework of choice.
pub trait RequestContext {
    /// HTTP method of the request
    fn method(&self) -> &str;

    /// CSRF token attached to the request, if any
    fn csrf_token(&self) -> Option<&str>;

    /// ID of the authenticated principal attached to the request, if any
    fn authenticated_user(&self) -> Option<&str>;
}

/// Request guard enforcing CSRF checks on state-changing requests.
///
/// Safe methods always pass. Unsafe methods are only checked when the
/// request carries an authenticated principal; an anonymous POST has
/// nothing to forge, so the check is a pass-through there.
pub struct CsrfProtection<S: TokenStorage> {
    service: CsrfService<S>,
}

impl<S: TokenStorage> CsrfProtection<S> {
    /// Creates a protection guard over the given CSRF service
    pub fn new(service: CsrfService<S>) -> Self {
        Self { service }
    }

    /// Checks the request, failing with `CsrfValidationFailed` when an
    /// authenticated state-changing request lacks a valid token
    pub async fn check<C>(&self, ctx: &C) -> AuthResult<()>
    where
        C: RequestContext + Sync,
    {
        let method = ctx.method();
        if SAFE_METHODS.iter().any(|m| m.eq_ignore_ascii_case(method)) {
            return Ok(());
        }

        let Some(user_id) = ctx.authenticated_user() else {
            return Ok(());
        };

        let Some(token) = ctx.csrf_token() else {
            debug!(principal = %user_id, %method, "missing CSRF token");
            return Err(AuthError::CsrfValidationFailed);
        };

        if self.service.verify(user_id, token).await? {
            Ok(())
        } else {
            debug!(principal = %user_id, %method, "invalid CSRF token");
            Err(AuthError::CsrfValidationFailed)
        }
    }
}

//! Service layer: token lifecycle, CSRF, and access guards.

pub mod access;
pub mod csrf;
pub mod token;

pub use access::{require_auth, require_roles};
pub use csrf::{CsrfProtection, CsrfService, RequestContext};
pub use token::{TokenService, TokenServiceConfig};

//! CSRF token module
//!
//! Generates and verifies short-lived, user-scoped anti-forgery tokens,
//! and provides a framework-independent request guard over them.

mod protection;
mod service;

#[cfg(test)]
mod tests;

pub use protection::{CsrfProtection, RequestContext, CSRF_HEADER, SAFE_METHODS};
pub use service::{CsrfService, DEFAULT_CSRF_MAX_AGE_HOURS};

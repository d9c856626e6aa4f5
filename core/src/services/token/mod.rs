//! Token lifecycle module
//!
//! This module handles all bearer-token operations:
//! - Access/refresh pair issuance and verification
//! - Refresh with subject and type validation
//! - Single-token revocation, bulk revocation, and rotation
//! - Background cleanup of expired records

mod cleanup;
mod codec;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupConfig, CleanupResult, CleanupService};
pub use codec::JwtCodec;
pub use config::TokenServiceConfig;
pub use service::TokenService;

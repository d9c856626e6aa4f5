//! # KeyGate Core
//!
//! Storage-agnostic authentication core: JWT access/refresh lifecycle,
//! revocation, per-principal token versioning, CSRF tokens, and the
//! storage capability trait backends implement. This crate carries no
//! networked backend; see `kg_infra` for the Redis implementation.

pub mod domain;
pub mod errors;
pub mod services;
pub mod storage;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
pub use storage::*;

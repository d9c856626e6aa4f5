//! Storage abstraction for revocation records, token versions, and CSRF
//! tokens.
//!
//! The capability trait is implemented by two backends: the in-process
//! [`MemoryTokenStorage`] in this crate and the Redis-backed storage in
//! `kg_infra`.

pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::MemoryTokenStorage;
pub use r#trait::TokenStorage;

#[cfg(test)]
mod tests;

//! Error taxonomy and error handling.

mod types;

pub use types::{AuthError, AuthResult, ErrorResponse, StorageError, TokenError};

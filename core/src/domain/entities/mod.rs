//! Domain entities representing the authentication data model.

pub mod principal;
pub mod token;

// Re-export commonly used types
pub use principal::Principal;
pub use token::{
    Claims, TokenData, TokenKind, TokenPair,
    ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS, TOKEN_TYPE_BEARER,
};

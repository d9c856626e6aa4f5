//! Signed-token codec: claims in, compact token string out, and back.

use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::domain::entities::token::Claims;
use crate::errors::TokenError;

/// Encodes and decodes claims as standard compact signed tokens
/// (`header.payload.signature`, base64url).
///
/// Pure: no side effects, deterministic for a given secret/algorithm
/// configuration. Interoperable with any standard-compliant verifier
/// sharing the same secret and algorithm.
pub struct JwtCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_free_validation: Validation,
}

impl JwtCodec {
    /// Creates a codec over a shared HMAC secret
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        let mut expiry_free_validation = Validation::new(algorithm);
        expiry_free_validation.validate_exp = false;

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_free_validation,
        }
    }

    /// Encodes claims into a signed token string
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| TokenError::TokenGenerationFailed)
    }

    /// Decodes and verifies a token string, checking signature and expiry
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        Self::map_decode(decode::<Claims>(token, &self.decoding_key, &self.validation))
    }

    /// Decodes a token whose signature verifies but whose expiry may have
    /// passed. Used by revocation to recover the real `exp` of a stale
    /// token so its record can carry a matching lifetime.
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<Claims, TokenError> {
        Self::map_decode(decode::<Claims>(
            token,
            &self.decoding_key,
            &self.expiry_free_validation,
        ))
    }

    fn map_decode(
        result: jsonwebtoken::errors::Result<jsonwebtoken::TokenData<Claims>>,
    ) -> Result<Claims, TokenError> {
        result
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(claim) => {
                    TokenError::MissingClaim {
                        claim: claim.clone(),
                    }
                }
                _ => TokenError::MalformedToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::principal::Principal;
    use chrono::Utc;

    fn codec() -> JwtCodec {
        JwtCodec::new("test_secret_key", Algorithm::HS256)
    }

    fn access_claims() -> Claims {
        let principal = Principal::new("u1", vec!["user".to_string()]);
        Claims::new_access(&principal, 30, 0)
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let claims = access_claims();
        let token = codec().encode(&claims).unwrap();

        // Three-part compact wire format
        assert_eq!(token.split('.').count(), 3);

        let decoded = codec().decode(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = codec().encode(&access_claims()).unwrap();

        let other = JwtCodec::new("a_different_secret", Algorithm::HS256);
        assert_eq!(other.decode(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_decode_rejects_expired() {
        let mut claims = access_claims();
        claims.iat = Utc::now().timestamp() - 7200;
        claims.exp = Utc::now().timestamp() - 3600;

        let token = codec().encode(&claims).unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::TokenExpired));
    }

    #[test]
    fn test_decode_ignoring_expiry_accepts_expired() {
        let mut claims = access_claims();
        claims.iat = Utc::now().timestamp() - 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = codec().encode(&claims).unwrap();

        assert_eq!(codec().decode(&token), Err(TokenError::TokenExpired));
        assert_eq!(codec().decode_ignoring_expiry(&token).unwrap(), claims);
    }

    #[test]
    fn test_decode_ignoring_expiry_still_checks_signature() {
        let token = codec().encode(&access_claims()).unwrap();

        let other = JwtCodec::new("a_different_secret", Algorithm::HS256);
        assert_eq!(
            other.decode_ignoring_expiry(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(
            codec().decode("not-a-token"),
            Err(TokenError::MalformedToken)
        );
    }

    #[test]
    fn test_decode_rejects_tampered_payload() {
        let token = codec().encode(&access_claims()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();

        // Swap in the payload of a different principal
        let other = Principal::new("u2", vec!["admin".to_string()]);
        let other_token = codec()
            .encode(&Claims::new_access(&other, 30, 0))
            .unwrap();
        let other_payload = other_token.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;

        let tampered = parts.join(".");
        assert_eq!(
            codec().decode(&tampered),
            Err(TokenError::InvalidSignature)
        );
    }
}

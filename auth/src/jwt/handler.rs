use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::Claims;
use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the payload type so callers define their own claims.
/// Uses HS256 (HMAC with SHA-256). One handler is bound to one secret;
/// keep separate handlers for separate token classes.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign a payload with an expiry relative to now.
    ///
    /// # Arguments
    /// * `payload` - Claims to encode (must implement Serialize)
    /// * `expires_in_seconds` - Token lifetime
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Lifetime out of range or token encoding failed
    pub fn encode<T: Serialize>(
        &self,
        payload: &T,
        expires_in_seconds: i64,
    ) -> Result<String, JwtError> {
        self.encode_claims(&Claims::expiring_in(payload, expires_in_seconds)?)
    }

    /// Sign fully specified claims.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode_claims<T: Serialize>(&self, claims: &Claims<T>) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its payload.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded payload
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` has elapsed
    /// * `InvalidToken` - Signature does not verify
    /// * `MissingClaim` - `exp` is absent
    /// * `DecodingFailed` - Token is malformed
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        self.decode_claims(token).map(|claims| claims.payload)
    }

    /// Verify a token and return the payload together with registered claims.
    pub fn decode_claims<T: DeserializeOwned>(&self, token: &str) -> Result<Claims<T>, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is exact: the cookie Max-Age and the token lifetime must agree
        validation.leeway = 0;

        let token_data = decode::<Claims<T>>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::InvalidSignature => JwtError::InvalidToken(e.to_string()),
                ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
                _ => JwtError::DecodingFailed(e.to_string()),
            },
        )?;

        Ok(token_data.claims)
    }
}

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::JwtError;

/// Identity payload signed into session tokens.
///
/// Carries no authorization scope beyond the username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TokenClaims {
    pub username: String,
}

impl TokenClaims {
    pub fn new(username: impl ToString) -> Self {
        Self {
            username: username.to_string(),
        }
    }
}

/// Registered claims wrapped around an application payload.
///
/// The payload fields are flattened into the token body next to `exp`, `iat`
/// and `jti`. The random `jti` keeps two tokens minted for the same payload in
/// the same second distinct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims<T> {
    #[serde(flatten)]
    pub payload: T,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Unique token identifier
    #[serde(default)]
    pub jti: String,
}

impl<T> Claims<T> {
    /// Wrap a payload with an expiry relative to now.
    ///
    /// # Arguments
    /// * `payload` - Application claims
    /// * `expires_in_seconds` - Seconds until the token expires
    ///
    /// # Returns
    /// Claims with `iat` set to now and `exp` set to now + `expires_in_seconds`
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry is not representable as a timestamp
    pub fn expiring_in(payload: T, expires_in_seconds: i64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expiration = Duration::try_seconds(expires_in_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::EncodingFailed(format!(
                    "Token lifetime out of range: {} seconds",
                    expires_in_seconds
                ))
            })?;

        Ok(Self {
            payload,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Wrap a payload with explicit timestamps.
    pub fn with_timestamps(payload: T, issued_at: i64, expiration: i64) -> Self {
        Self {
            payload,
            exp: expiration,
            iat: issued_at,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

use auth::JwtHandler;
use auth::TokenClaims;

use crate::domain::session::errors::TokenError;
use crate::domain::session::ports::TokenIssuer;

/// HS256 JWT issuer.
///
/// Keys are derived per call from the secret handed in, so one instance
/// serves both the access and the refresh token class.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtTokenService;

impl JwtTokenService {
    pub fn new() -> Self {
        Self
    }
}

impl TokenIssuer for JwtTokenService {
    fn create_token(
        &self,
        claims: &TokenClaims,
        secret: &str,
        expiration_seconds: u64,
    ) -> Result<String, TokenError> {
        let expires_in = i64::try_from(expiration_seconds).map_err(|_| {
            TokenError::SigningFailed(format!(
                "Expiration out of range: {} seconds",
                expiration_seconds
            ))
        })?;

        Ok(JwtHandler::new(secret.as_bytes()).encode(claims, expires_in)?)
    }

    fn check_token(&self, token: &str, secret: &str) -> Result<TokenClaims, TokenError> {
        Ok(JwtHandler::new(secret.as_bytes()).decode(token)?)
    }
}

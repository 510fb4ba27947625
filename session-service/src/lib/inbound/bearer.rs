use std::sync::Arc;

use auth::find_cookie;
use auth::CookieName;
use http::header::AUTHORIZATION;
use http::header::COOKIE;
use http::HeaderMap;

use crate::domain::session::errors::SessionError;
use crate::domain::session::errors::TokenError;
use crate::domain::session::login::LoginUseCases;
use crate::domain::session::models::RefreshedSession;
use crate::domain::session::models::UserWithoutPassword;
use crate::domain::session::ports::CredentialHasher;
use crate::domain::session::ports::TokenIssuer;
use crate::domain::session::ports::UserDirectory;

const BEARER_SCHEME: &str = "Bearer";

/// Access token from the `Authentication` cookie, else from
/// `Authorization: Bearer`.
pub fn extract_access_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, CookieName::Authentication).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_credentials)
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}

/// Refresh token from the `Refresh` cookie.
pub fn extract_refresh_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, CookieName::Refresh)
}

/// Credentials of an `Authorization` value whose scheme is `Bearer`, matched
/// case-insensitively.
fn bearer_credentials(value: &str) -> Option<&str> {
    let (scheme, credentials) = value.trim_start().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case(BEARER_SCHEME)
        .then_some(credentials)
}

fn cookie_value(headers: &HeaderMap, name: CookieName) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| find_cookie(header, name))
}

fn missing_token(name: CookieName) -> SessionError {
    SessionError::TokenInvalid(TokenError::ExpiredOrInvalidToken(format!(
        "No {} token presented",
        name
    )))
}

/// Resolves request headers to an authenticated user.
pub struct BearerAuthenticator<UD, CH, TI>
where
    UD: UserDirectory,
    CH: CredentialHasher,
    TI: TokenIssuer,
{
    login: Arc<LoginUseCases<UD, CH, TI>>,
}

impl<UD, CH, TI> BearerAuthenticator<UD, CH, TI>
where
    UD: UserDirectory,
    CH: CredentialHasher,
    TI: TokenIssuer,
{
    pub fn new(login: Arc<LoginUseCases<UD, CH, TI>>) -> Self {
        Self { login }
    }

    /// Verify the presented access token and re-check its user.
    ///
    /// # Errors
    /// * `TokenInvalid` - No token, or it is expired, forged, or malformed
    /// * `NotFound` - Token is valid but its user no longer exists
    /// * `Directory` - Lookup failed
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<UserWithoutPassword, SessionError> {
        let token = extract_access_token(headers)
            .ok_or_else(|| missing_token(CookieName::Authentication))?;

        let claims = self.login.verify_access_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Bearer rejected");
            e
        })?;

        match self
            .login
            .validate_user_for_jwt_strategy(&claims.username)
            .await?
        {
            Some(user) => Ok(UserWithoutPassword::from(user)),
            None => {
                tracing::warn!(
                    username = %claims.username,
                    "Bearer rejected: user no longer exists"
                );
                Err(SessionError::NotFound(claims.username))
            }
        }
    }

    /// Exchange the presented refresh cookie for a new cookie pair.
    ///
    /// # Errors
    /// * `TokenInvalid` - No token, or it is expired, forged, or malformed
    /// * `CredentialMismatch` - Token does not match the stored hash
    /// * `StaleRefreshToken` - A concurrent rotation already consumed it
    /// * `Hashing`, `Token`, `Directory` - Infrastructure failures
    pub async fn authenticate_refresh(
        &self,
        headers: &HeaderMap,
    ) -> Result<RefreshedSession, SessionError> {
        let token =
            extract_refresh_token(headers).ok_or_else(|| missing_token(CookieName::Refresh))?;

        match self.login.rotate_refresh_token(token).await {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Err(SessionError::CredentialMismatch),
            Err(e) => {
                if e.is_unauthenticated() {
                    tracing::warn!(error = %e, "Refresh rejected");
                }
                Err(e)
            }
        }
    }
}

use std::sync::Arc;

use auth::CookieName;
use auth::SessionCookie;
use auth::TokenClaims;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::RefreshedSession;
use crate::domain::session::models::SessionSettings;
use crate::domain::session::models::User;
use crate::domain::session::models::UserWithoutPassword;
use crate::domain::session::ports::CredentialHasher;
use crate::domain::session::ports::TokenIssuer;
use crate::domain::session::ports::UserDirectory;

/// Login, token issuance and refresh operations.
///
/// Holds no session state of its own: the only per-user state is the
/// refresh-token hash kept by the directory.
pub struct LoginUseCases<UD, CH, TI>
where
    UD: UserDirectory,
    CH: CredentialHasher,
    TI: TokenIssuer,
{
    directory: Arc<UD>,
    hasher: Arc<CH>,
    tokens: Arc<TI>,
    settings: SessionSettings,
}

impl<UD, CH, TI> LoginUseCases<UD, CH, TI>
where
    UD: UserDirectory,
    CH: CredentialHasher,
    TI: TokenIssuer,
{
    pub fn new(
        directory: Arc<UD>,
        hasher: Arc<CH>,
        tokens: Arc<TI>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            directory,
            hasher,
            tokens,
            settings,
        }
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords both yield `None`; the stored hash is
    /// only compared when the user exists. On success the last-login stamp is
    /// written before returning.
    ///
    /// # Errors
    /// * `Hashing` - Password comparison could not run
    /// * `Directory` - Lookup or last-login update failed
    pub async fn validate_user_for_local_strategy(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, SessionError> {
        const OPERATION: &str = "validate_user_for_local_strategy";

        let Some(user) = self.find_user(OPERATION, username).await? else {
            tracing::debug!(username = %username, "Login rejected: unknown user");
            return Ok(None);
        };

        let matches = self
            .hasher
            .compare(password, &user.password_hash)
            .await
            .map_err(|e| infrastructure_error(OPERATION, username, e))?;

        if !matches {
            tracing::debug!(username = %username, "Login rejected: password mismatch");
            return Ok(None);
        }

        self.directory
            .update_last_login(username)
            .await
            .map_err(|e| infrastructure_error(OPERATION, username, e))?;

        tracing::info!(username = %username, "User logged in");
        Ok(Some(user))
    }

    /// Mint an access token and wrap it in an `Authentication` cookie.
    ///
    /// # Errors
    /// * `Token` - Signing failed
    pub fn get_cookie_with_jwt_token(&self, username: &str) -> Result<SessionCookie, SessionError> {
        let token = self
            .tokens
            .create_token(
                &TokenClaims::new(username),
                &self.settings.access_secret,
                self.settings.lifetimes.access_seconds,
            )
            .map_err(|e| infrastructure_error("get_cookie_with_jwt_token", username, e))?;

        tracing::info!(
            username = %username,
            max_age = self.settings.lifetimes.access_seconds,
            "Access token issued"
        );

        Ok(SessionCookie::issue(
            CookieName::Authentication,
            token,
            self.settings.lifetimes.access_seconds,
        ))
    }

    /// Mint a refresh token, store its hash, and wrap the raw token in a
    /// `Refresh` cookie.
    ///
    /// Overwrites any previously stored refresh hash for the user.
    ///
    /// # Errors
    /// * `Token` - Signing failed
    /// * `Hashing` - Hashing the token failed
    /// * `Directory` - Persisting the hash failed
    pub async fn get_cookie_with_jwt_refresh_token(
        &self,
        username: &str,
    ) -> Result<SessionCookie, SessionError> {
        let token = self.create_refresh_token("get_cookie_with_jwt_refresh_token", username)?;
        self.set_current_refresh_token(&token, username).await?;

        tracing::info!(
            username = %username,
            max_age = self.settings.lifetimes.refresh_seconds,
            "Refresh token issued"
        );

        Ok(SessionCookie::issue(
            CookieName::Refresh,
            token,
            self.settings.lifetimes.refresh_seconds,
        ))
    }

    /// Re-check the user behind an already verified access token.
    ///
    /// Returns `None` if the user was removed after the token was issued.
    ///
    /// # Errors
    /// * `Directory` - Lookup failed
    pub async fn validate_user_for_jwt_strategy(
        &self,
        username: &str,
    ) -> Result<Option<User>, SessionError> {
        self.find_user("validate_user_for_jwt_strategy", username)
            .await
    }

    /// Compare a raw refresh token against the user's stored hash.
    ///
    /// Returns `None` when the user is unknown, holds no refresh hash, or the
    /// token does not match.
    ///
    /// # Errors
    /// * `Hashing` - Comparison could not run
    /// * `Directory` - Lookup failed
    pub async fn get_user_if_refresh_token_matches(
        &self,
        refresh_token: &str,
        username: &str,
    ) -> Result<Option<User>, SessionError> {
        const OPERATION: &str = "get_user_if_refresh_token_matches";

        let Some(user) = self.find_user(OPERATION, username).await? else {
            return Ok(None);
        };

        let Some(stored_hash) = user.refresh_token_hash.as_deref() else {
            tracing::debug!(username = %username, "Refresh rejected: no stored refresh token");
            return Ok(None);
        };

        let matches = self
            .hasher
            .compare(refresh_token, stored_hash)
            .await
            .map_err(|e| infrastructure_error(OPERATION, username, e))?;

        if matches {
            Ok(Some(user))
        } else {
            tracing::warn!(username = %username, "Refresh rejected: token mismatch");
            Ok(None)
        }
    }

    /// Stamp the user's last login.
    ///
    /// # Errors
    /// * `Directory` - Update failed
    pub async fn update_login_time(&self, username: &str) -> Result<(), SessionError> {
        self.directory
            .update_last_login(username)
            .await
            .map_err(|e| infrastructure_error("update_login_time", username, e))
    }

    /// Hash a raw refresh token and store the hash for the user.
    ///
    /// # Errors
    /// * `Hashing` - Hashing failed
    /// * `Directory` - Persisting the hash failed
    pub async fn set_current_refresh_token(
        &self,
        refresh_token: &str,
        username: &str,
    ) -> Result<(), SessionError> {
        const OPERATION: &str = "set_current_refresh_token";

        let hash = self
            .hasher
            .hash(refresh_token)
            .await
            .map_err(|e| infrastructure_error(OPERATION, username, e))?;

        self.directory
            .update_refresh_token(username, &hash)
            .await
            .map_err(|e| infrastructure_error(OPERATION, username, e))
    }

    /// Verify an access token's signature and expiry.
    ///
    /// # Errors
    /// * `TokenInvalid` - Token is expired, forged, or malformed
    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, SessionError> {
        Ok(self
            .tokens
            .check_token(token, &self.settings.access_secret)?)
    }

    /// Verify a refresh token's signature and expiry.
    ///
    /// # Errors
    /// * `TokenInvalid` - Token is expired, forged, or malformed
    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenClaims, SessionError> {
        Ok(self
            .tokens
            .check_token(token, &self.settings.refresh_secret)?)
    }

    /// Exchange a raw refresh token for a new access/refresh pair.
    ///
    /// The new refresh hash is stored with a compare-and-swap against the
    /// version observed while matching, so of two concurrent rotations of the
    /// same token only one succeeds.
    ///
    /// # Returns
    /// `None` if the token verifies but does not match the stored hash
    ///
    /// # Errors
    /// * `TokenInvalid` - Token is expired, forged, or malformed
    /// * `StaleRefreshToken` - Another rotation won the race
    /// * `Hashing`, `Token`, `Directory` - Infrastructure failures
    pub async fn rotate_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshedSession>, SessionError> {
        const OPERATION: &str = "rotate_refresh_token";

        let claims = self.verify_refresh_token(refresh_token)?;
        let username = claims.username.as_str();

        let Some(user) = self
            .get_user_if_refresh_token_matches(refresh_token, username)
            .await?
        else {
            return Ok(None);
        };

        let new_refresh_token = self.create_refresh_token(OPERATION, username)?;

        let hash = self
            .hasher
            .hash(&new_refresh_token)
            .await
            .map_err(|e| infrastructure_error(OPERATION, username, e))?;

        let swapped = self
            .directory
            .compare_and_swap_refresh_token(username, user.refresh_token_version, &hash)
            .await
            .map_err(|e| infrastructure_error(OPERATION, username, e))?;

        if !swapped {
            tracing::warn!(
                username = %username,
                observed_version = user.refresh_token_version,
                "Refresh rotation lost to a concurrent rotation"
            );
            return Err(SessionError::StaleRefreshToken(username.to_string()));
        }

        tracing::info!(username = %username, "Refresh token rotated");
        let access_cookie = self.get_cookie_with_jwt_token(username)?;

        Ok(Some(RefreshedSession {
            user: UserWithoutPassword::from(user),
            access_cookie,
            refresh_cookie: SessionCookie::issue(
                CookieName::Refresh,
                new_refresh_token,
                self.settings.lifetimes.refresh_seconds,
            ),
        }))
    }

    /// Users whose last login predates `cutoff`.
    ///
    /// # Errors
    /// * `Directory` - Query failed
    pub async fn inactive_users_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<UserWithoutPassword>, SessionError> {
        let users = self
            .directory
            .get_users_with_last_login_before(cutoff)
            .await
            .map_err(|e| {
                let err = SessionError::from(e);
                tracing::error!(
                    operation = "inactive_users_since",
                    error = %err,
                    "Session operation failed"
                );
                err
            })?;

        Ok(users.into_iter().map(UserWithoutPassword::from).collect())
    }

    async fn find_user(
        &self,
        operation: &'static str,
        username: &str,
    ) -> Result<Option<User>, SessionError> {
        self.directory
            .get_by_username(username)
            .await
            .map_err(|e| infrastructure_error(operation, username, e))
    }

    fn create_refresh_token(
        &self,
        operation: &'static str,
        username: &str,
    ) -> Result<String, SessionError> {
        self.tokens
            .create_token(
                &TokenClaims::new(username),
                &self.settings.refresh_secret,
                self.settings.lifetimes.refresh_seconds,
            )
            .map_err(|e| infrastructure_error(operation, username, e))
    }
}

/// Log an infrastructure fault with its context and hand it back.
///
/// Only the operation name, username and error text are recorded.
pub(crate) fn infrastructure_error<E>(
    operation: &'static str,
    username: &str,
    err: E,
) -> SessionError
where
    E: Into<SessionError>,
{
    let err = err.into();
    tracing::error!(
        operation = operation,
        username = %username,
        error = %err,
        "Session operation failed"
    );
    err
}

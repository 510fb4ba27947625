use std::sync::Arc;

use auth::clearing_cookies;

use crate::domain::session::errors::SessionError;
use crate::domain::session::login::infrastructure_error;
use crate::domain::session::ports::UserDirectory;

/// Logout operations.
pub struct LogoutUseCases<UD>
where
    UD: UserDirectory,
{
    directory: Arc<UD>,
}

impl<UD> LogoutUseCases<UD>
where
    UD: UserDirectory,
{
    pub fn new(directory: Arc<UD>) -> Self {
        Self { directory }
    }

    /// Clearing directives for both session cookies.
    ///
    /// Touches no server state: a refresh token still stored for the user
    /// stays usable until it expires. Use [`LogoutUseCases::revoke`] when the
    /// caller is authenticated.
    pub fn execute(&self) -> [String; 2] {
        clearing_cookies().map(|cookie| cookie.to_header_value())
    }

    /// Drop the user's stored refresh hash, then return the clearing directives.
    ///
    /// `username` must come from a verified access token.
    ///
    /// # Errors
    /// * `Directory` - Clearing the stored hash failed
    pub async fn revoke(&self, username: &str) -> Result<[String; 2], SessionError> {
        self.directory
            .clear_refresh_token(username)
            .await
            .map_err(|e| infrastructure_error("revoke", username, e))?;

        tracing::info!(username = %username, "Session revoked");
        Ok(self.execute())
    }
}

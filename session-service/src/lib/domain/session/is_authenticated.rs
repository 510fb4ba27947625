use std::sync::Arc;

use crate::domain::session::errors::SessionError;
use crate::domain::session::login::infrastructure_error;
use crate::domain::session::models::UserWithoutPassword;
use crate::domain::session::ports::UserDirectory;

/// Resolves the profile of a user whose token was already verified.
pub struct IsAuthenticatedUseCases<UD>
where
    UD: UserDirectory,
{
    directory: Arc<UD>,
}

impl<UD> IsAuthenticatedUseCases<UD>
where
    UD: UserDirectory,
{
    pub fn new(directory: Arc<UD>) -> Self {
        Self { directory }
    }

    /// Look up `username` and return it without credential hashes.
    ///
    /// # Errors
    /// * `NotFound` - No user with this username
    /// * `Directory` - Lookup failed
    pub async fn execute(&self, username: &str) -> Result<UserWithoutPassword, SessionError> {
        self.directory
            .get_by_username(username)
            .await
            .map_err(|e| infrastructure_error("is_authenticated", username, e))?
            .map(UserWithoutPassword::from)
            .ok_or_else(|| SessionError::NotFound(username.to_string()))
    }
}

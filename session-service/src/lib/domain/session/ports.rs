use async_trait::async_trait;
use auth::TokenClaims;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::DirectoryError;
use crate::domain::session::errors::HasherError;
use crate::domain::session::errors::TokenError;
use crate::domain::session::models::User;

/// Lookup and persistence operations the session lifecycle needs from the
/// user store.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError>;

    /// Stamp the user's last login with the current time.
    ///
    /// Unknown usernames are a no-op.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_last_login(&self, username: &str) -> Result<(), DirectoryError>;

    /// Store a refresh-token hash unconditionally, replacing any previous one
    /// and bumping `refresh_token_version`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_refresh_token(&self, username: &str, hash: &str)
        -> Result<(), DirectoryError>;

    /// Store a refresh-token hash only if `refresh_token_version` still equals
    /// `expected_version`, bumping it on success.
    ///
    /// # Returns
    /// True if the hash was stored, false if another writer got there first
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn compare_and_swap_refresh_token(
        &self,
        username: &str,
        expected_version: i64,
        hash: &str,
    ) -> Result<bool, DirectoryError>;

    /// Drop the stored refresh-token hash and bump `refresh_token_version`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn clear_refresh_token(&self, username: &str) -> Result<(), DirectoryError>;

    /// Retrieve users whose last login predates `cutoff`.
    ///
    /// Users who never logged in are not included.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn get_users_with_last_login_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<User>, DirectoryError>;
}

/// One-way hashing for passwords and refresh-token material.
#[async_trait]
pub trait CredentialHasher: Send + Sync + 'static {
    /// Hash a plaintext value with the configured work factor.
    ///
    /// # Errors
    /// * `HashingFailed` - The hashing back-end failed
    async fn hash(&self, plaintext: &str) -> Result<String, HasherError>;

    /// Constant-time check of a plaintext value against a stored hash.
    ///
    /// # Returns
    /// True on match, false on mismatch
    ///
    /// # Errors
    /// * `ComparisonFailed` - Stored hash is malformed or the back-end failed
    async fn compare(&self, plaintext: &str, hash: &str) -> Result<bool, HasherError>;
}

/// Signing and verification of bearer tokens.
pub trait TokenIssuer: Send + Sync + 'static {
    /// Sign `claims` with `secret`, expiring `expiration_seconds` from now.
    ///
    /// # Errors
    /// * `SigningFailed` - Token could not be produced
    fn create_token(
        &self,
        claims: &TokenClaims,
        secret: &str,
        expiration_seconds: u64,
    ) -> Result<String, TokenError>;

    /// Verify signature and expiry of `token` against `secret`.
    ///
    /// # Errors
    /// * `ExpiredOrInvalidToken` - Signature mismatch, expiry elapsed, or malformed token
    fn check_token(&self, token: &str, secret: &str) -> Result<TokenClaims, TokenError>;
}

use std::fmt;

use auth::SessionCookie;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// User record as held by the directory.
///
/// Carries both one-way hashes; never hand this out past the trust boundary,
/// project it with [`UserWithoutPassword::from`] first.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub refresh_token_hash: Option<String>,
    /// Bumped on every write of `refresh_token_hash`
    pub refresh_token_version: i64,
}

impl User {
    /// Build a freshly provisioned user that has never logged in.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
            refresh_token_hash: None,
            refresh_token_version: 0,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outward view of a user with both credential hashes removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithoutPassword {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserWithoutPassword {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

impl From<User> for UserWithoutPassword {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Token lifetimes in seconds, mirrored into cookie `Max-Age`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access_seconds: u64,
    pub refresh_seconds: u64,
}

/// Secrets and lifetimes for both token classes.
#[derive(Clone)]
pub struct SessionSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub lifetimes: TokenLifetimes,
}

impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("lifetimes", &self.lifetimes)
            .finish()
    }
}

impl From<&crate::config::JwtConfig> for SessionSettings {
    fn from(config: &crate::config::JwtConfig) -> Self {
        Self {
            access_secret: config.secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            lifetimes: TokenLifetimes {
                access_seconds: config.expiration_time,
                refresh_seconds: config.refresh_expiration_time,
            },
        }
    }
}

/// Outcome of a successful refresh rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshedSession {
    pub user: UserWithoutPassword,
    pub access_cookie: SessionCookie,
    pub refresh_cookie: SessionCookie,
}

impl RefreshedSession {
    /// `Set-Cookie` values, access cookie first.
    pub fn cookies(&self) -> [String; 2] {
        [
            self.access_cookie.to_header_value(),
            self.refresh_cookie.to_header_value(),
        ]
    }
}

/// Instant `days` whole days before `now`.
///
/// Returns `None` when the result falls outside the representable range.
pub fn inactivity_cutoff(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|window| now.checked_sub_signed(window))
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::session::errors::DirectoryError;
use crate::domain::session::models::User;
use crate::domain::session::ports::UserDirectory;

/// Process-local directory keyed by username.
///
/// Every write takes the lock for its whole read-modify-write, so the
/// version check in `compare_and_swap_refresh_token` is atomic.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user record.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.username.clone(), user);
    }

    async fn modify<F>(&self, username: &str, change: F)
    where
        F: FnOnce(&mut User) + Send,
    {
        if let Some(user) = self.users.write().await.get_mut(username) {
            change(user);
            user.updated_at = Utc::now();
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn update_last_login(&self, username: &str) -> Result<(), DirectoryError> {
        self.modify(username, |user| user.last_login_at = Some(Utc::now()))
            .await;
        Ok(())
    }

    async fn update_refresh_token(
        &self,
        username: &str,
        hash: &str,
    ) -> Result<(), DirectoryError> {
        let hash = hash.to_string();
        self.modify(username, move |user| {
            user.refresh_token_hash = Some(hash);
            user.refresh_token_version += 1;
        })
        .await;
        Ok(())
    }

    async fn compare_and_swap_refresh_token(
        &self,
        username: &str,
        expected_version: i64,
        hash: &str,
    ) -> Result<bool, DirectoryError> {
        let mut users = self.users.write().await;

        match users.get_mut(username) {
            Some(user) if user.refresh_token_version == expected_version => {
                user.refresh_token_hash = Some(hash.to_string());
                user.refresh_token_version += 1;
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_refresh_token(&self, username: &str) -> Result<(), DirectoryError> {
        self.modify(username, |user| {
            user.refresh_token_hash = None;
            user.refresh_token_version += 1;
        })
        .await;
        Ok(())
    }

    async fn get_users_with_last_login_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<User>, DirectoryError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|user| matches!(user.last_login_at, Some(at) if at < cutoff))
            .cloned()
            .collect();
        users.sort_by_key(|user| user.last_login_at);

        Ok(users)
    }
}

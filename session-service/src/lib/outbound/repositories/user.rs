use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::session::errors::DirectoryError;
use crate::domain::session::models::User;
use crate::domain::session::models::UserId;
use crate::domain::session::ports::UserDirectory;

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at, \
     last_login_at, refresh_token_hash, refresh_token_version";

pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Provision a user row.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    pub async fn create(&self, user: &User) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("users_username_key")
                {
                    return DirectoryError::UsernameAlreadyExists(user.username.clone());
                }
            }
            database_error(e)
        })?;

        Ok(())
    }
}

fn database_error(err: sqlx::Error) -> DirectoryError {
    DirectoryError::DatabaseError(err.to_string())
}

fn user_from_row(row: &PgRow) -> Result<User, DirectoryError> {
    Ok(User {
        id: UserId(row.try_get("id").map_err(database_error)?),
        username: row.try_get("username").map_err(database_error)?,
        password_hash: row.try_get("password_hash").map_err(database_error)?,
        created_at: row.try_get("created_at").map_err(database_error)?,
        updated_at: row.try_get("updated_at").map_err(database_error)?,
        last_login_at: row.try_get("last_login_at").map_err(database_error)?,
        refresh_token_hash: row.try_get("refresh_token_hash").map_err(database_error)?,
        refresh_token_version: row
            .try_get("refresh_token_version")
            .map_err(database_error)?,
    })
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_last_login(&self, username: &str) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW(), updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn update_refresh_token(
        &self,
        username: &str,
        hash: &str,
    ) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $2,
                refresh_token_version = refresh_token_version + 1,
                updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(hash)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn compare_and_swap_refresh_token(
        &self,
        username: &str,
        expected_version: i64,
        hash: &str,
    ) -> Result<bool, DirectoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $3,
                refresh_token_version = refresh_token_version + 1,
                updated_at = NOW()
            WHERE username = $1 AND refresh_token_version = $2
            "#,
        )
        .bind(username)
        .bind(expected_version)
        .bind(hash)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn clear_refresh_token(&self, username: &str) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = NULL,
                refresh_token_version = refresh_token_version + 1,
                updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn get_users_with_last_login_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<User>, DirectoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE last_login_at < $1 ORDER BY last_login_at ASC",
            USER_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.iter().map(user_from_row).collect()
    }
}

use async_trait::async_trait;
use auth::PasswordHasher;

use crate::config::HasherConfig;
use crate::domain::session::errors::HasherError;
use crate::domain::session::ports::CredentialHasher;

/// Argon2id credential hasher.
///
/// Hashing is CPU-bound, so both operations run on the blocking thread pool
/// to keep the async workers free.
#[derive(Clone, Default)]
pub struct Argon2CredentialHasher {
    hasher: PasswordHasher,
}

impl Argon2CredentialHasher {
    /// Create a hasher with the configured work factor.
    ///
    /// # Errors
    /// * `HashingFailed` - Work factor is outside Argon2's accepted ranges
    pub fn new(config: &HasherConfig) -> Result<Self, HasherError> {
        let hasher = PasswordHasher::with_params(
            config.memory_cost_kib,
            config.iterations,
            config.parallelism,
        )
        .map_err(|e| HasherError::HashingFailed(e.to_string()))?;

        Ok(Self { hasher })
    }
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, HasherError> {
        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| HasherError::HashingFailed(format!("Hashing task failed: {}", e)))?
            .map_err(|e| HasherError::HashingFailed(e.to_string()))
    }

    async fn compare(&self, plaintext: &str, hash: &str) -> Result<bool, HasherError> {
        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .map_err(|e| HasherError::ComparisonFailed(format!("Comparison task failed: {}", e)))?
            .map_err(|e| HasherError::ComparisonFailed(e.to_string()))
    }
}

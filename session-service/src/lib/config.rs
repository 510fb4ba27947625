use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub hasher: HasherConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Access and refresh token settings.
///
/// Lifetimes are in seconds and are mirrored exactly into cookie `Max-Age`.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_time: u64,
    pub refresh_secret: String,
    pub refresh_expiration_time: u64,
}

/// Argon2id work factor used for new hashes.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HasherConfig {
    pub memory_cost_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Longest accepted token lifetime: ten years.
pub const MAX_TOKEN_LIFETIME_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// Missing or inconsistent token settings are an error: the process must
    /// not start without both secrets and both lifetimes.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__REFRESH_SECRET=... overrides jwt.refresh_secret
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.jwt.validate()?;

        Ok(config)
    }
}

impl JwtConfig {
    /// Reject settings that would silently weaken the token split.
    ///
    /// # Errors
    /// * `ConfigError::Message` - Empty secret, shared secret, or a lifetime that
    ///   is zero or above [`MAX_TOKEN_LIFETIME_SECONDS`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret and jwt.refresh_secret must not be empty".to_string(),
            ));
        }

        if self.secret == self.refresh_secret {
            return Err(ConfigError::Message(
                "jwt.secret and jwt.refresh_secret must differ".to_string(),
            ));
        }

        if self.expiration_time == 0 || self.refresh_expiration_time == 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_time and jwt.refresh_expiration_time must be positive".to_string(),
            ));
        }

        if self.expiration_time > MAX_TOKEN_LIFETIME_SECONDS
            || self.refresh_expiration_time > MAX_TOKEN_LIFETIME_SECONDS
        {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_time and jwt.refresh_expiration_time must not exceed {} seconds",
                MAX_TOKEN_LIFETIME_SECONDS
            )));
        }

        Ok(())
    }
}

pub mod db;

use std::sync::Arc;

use session_service::config::HasherConfig;
use session_service::inbound::bearer::BearerAuthenticator;
use session_service::outbound::hasher::Argon2CredentialHasher;
use session_service::outbound::repositories::InMemoryUserDirectory;
use session_service::outbound::tokens::JwtTokenService;
use session_service::session::is_authenticated::IsAuthenticatedUseCases;
use session_service::session::login::LoginUseCases;
use session_service::session::logout::LogoutUseCases;
use session_service::session::models::SessionSettings;
use session_service::session::models::TokenLifetimes;
use session_service::session::models::User;
use session_service::session::ports::CredentialHasher;

pub const ACCESS_SECRET: &str = "access-secret-at-least-32-bytes-long";
pub const REFRESH_SECRET: &str = "refresh-secret-at-least-32-bytes-long";

pub type TestLogin =
    LoginUseCases<InMemoryUserDirectory, Argon2CredentialHasher, JwtTokenService>;

/// Session stack wired to real hashing and signing over an in-memory directory
pub struct TestSession {
    pub directory: Arc<InMemoryUserDirectory>,
    pub hasher: Arc<Argon2CredentialHasher>,
    pub login: Arc<TestLogin>,
    pub logout: LogoutUseCases<InMemoryUserDirectory>,
    pub is_authenticated: IsAuthenticatedUseCases<InMemoryUserDirectory>,
    pub authenticator:
        BearerAuthenticator<InMemoryUserDirectory, Argon2CredentialHasher, JwtTokenService>,
    pub lifetimes: TokenLifetimes,
}

impl TestSession {
    /// Build the stack with one-hour access and two-hour refresh lifetimes
    pub async fn spawn() -> Self {
        Self::with_lifetimes(TokenLifetimes {
            access_seconds: 3600,
            refresh_seconds: 7200,
        })
        .await
    }

    pub async fn with_lifetimes(lifetimes: TokenLifetimes) -> Self {
        // Cheap work factor keeps the suite fast
        let hasher = Arc::new(
            Argon2CredentialHasher::new(&HasherConfig {
                memory_cost_kib: 1024,
                iterations: 1,
                parallelism: 1,
            })
            .expect("Failed to build hasher"),
        );
        let directory = Arc::new(InMemoryUserDirectory::new());

        let login = Arc::new(LoginUseCases::new(
            Arc::clone(&directory),
            Arc::clone(&hasher),
            Arc::new(JwtTokenService::new()),
            SessionSettings {
                access_secret: ACCESS_SECRET.to_string(),
                refresh_secret: REFRESH_SECRET.to_string(),
                lifetimes,
            },
        ));

        Self {
            logout: LogoutUseCases::new(Arc::clone(&directory)),
            is_authenticated: IsAuthenticatedUseCases::new(Arc::clone(&directory)),
            authenticator: BearerAuthenticator::new(Arc::clone(&login)),
            directory,
            hasher,
            login,
            lifetimes,
        }
    }

    /// Provision a user whose password hash was produced by the real hasher
    pub async fn create_user(&self, username: &str, password: &str) {
        let hash = self
            .hasher
            .hash(password)
            .await
            .expect("Failed to hash password");
        self.directory.insert(User::new(username, hash)).await;
    }

    pub async fn stored_user(&self, username: &str) -> User {
        use session_service::session::ports::UserDirectory;

        self.directory
            .get_by_username(username)
            .await
            .expect("Lookup failed")
            .expect("User missing")
    }
}

use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use clap::Subcommand;
use http::header::AUTHORIZATION;
use http::header::COOKIE;
use http::HeaderMap;
use http::HeaderValue;
use session_service::config::Config;
use session_service::inbound::bearer::BearerAuthenticator;
use session_service::outbound::hasher::Argon2CredentialHasher;
use session_service::outbound::tokens::JwtTokenService;
use session_service::repositories::PostgresUserDirectory;
use session_service::session::login::LoginUseCases;
use session_service::session::logout::LogoutUseCases;
use session_service::session::models::inactivity_cutoff;
use session_service::session::models::SessionSettings;
use session_service::session::models::User;
use session_service::session::ports::CredentialHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "session-service", version, about = "Session lifecycle operator tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an Argon2id hash of a password
    HashPassword { password: String },
    /// Provision a user with a password
    CreateUser { username: String, password: String },
    /// Check credentials and print the access and refresh Set-Cookie values
    Login { username: String, password: String },
    /// Exchange a refresh token for a new cookie pair
    Refresh { token: String },
    /// Verify an access token and print its user
    Verify { token: String },
    /// Revoke the refresh token of the user behind an access token
    Logout { token: String },
    /// List users whose last login is older than the given number of days
    Inactive {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
}

type Login = LoginUseCases<PostgresUserDirectory, Argon2CredentialHasher, JwtTokenService>;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug,auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    tracing::info!(
        database_url = %config.database.url,
        access_expiration = config.jwt.expiration_time,
        refresh_expiration = config.jwt.refresh_expiration_time,
        "Configuration loaded"
    );

    let hasher = Arc::new(Argon2CredentialHasher::new(&config.hasher)?);

    if let Command::HashPassword { password } = &cli.command {
        println!("{}", hasher.hash(password).await?);
        return Ok(());
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let directory = Arc::new(PostgresUserDirectory::new(pg_pool));
    let login: Arc<Login> = Arc::new(LoginUseCases::new(
        Arc::clone(&directory),
        Arc::clone(&hasher),
        Arc::new(JwtTokenService::new()),
        SessionSettings::from(&config.jwt),
    ));
    let authenticator = BearerAuthenticator::new(Arc::clone(&login));
    let logout = LogoutUseCases::new(Arc::clone(&directory));

    match cli.command {
        Command::HashPassword { .. } => {}
        Command::CreateUser { username, password } => {
            let user = User::new(username, hasher.hash(&password).await?);
            directory.create(&user).await?;
            tracing::info!(username = %user.username, user_id = %user.id, "User created");
        }
        Command::Login { username, password } => {
            let Some(user) = login
                .validate_user_for_local_strategy(&username, &password)
                .await?
            else {
                anyhow::bail!("Invalid credentials");
            };

            let access_cookie = login.get_cookie_with_jwt_token(&user.username)?;
            let refresh_cookie = login
                .get_cookie_with_jwt_refresh_token(&user.username)
                .await?;

            println!("Set-Cookie: {}", access_cookie);
            println!("Set-Cookie: {}", refresh_cookie);
        }
        Command::Refresh { token } => {
            let mut headers = HeaderMap::new();
            headers.insert(COOKIE, HeaderValue::from_str(&format!("Refresh={}", token))?);

            let session = authenticator.authenticate_refresh(&headers).await?;
            for cookie in session.cookies() {
                println!("Set-Cookie: {}", cookie);
            }
        }
        Command::Verify { token } => {
            let user = authenticator.authenticate(&bearer_headers(&token)?).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Logout { token } => {
            let user = authenticator.authenticate(&bearer_headers(&token)?).await?;
            for cookie in logout.revoke(&user.username).await? {
                println!("Set-Cookie: {}", cookie);
            }
        }
        Command::Inactive { days } => {
            let cutoff = inactivity_cutoff(Utc::now(), days)
                .ok_or_else(|| anyhow::anyhow!("--days out of range: {}", days))?;
            let users = login.inactive_users_since(cutoff).await?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
    }

    Ok(())
}

fn bearer_headers(token: &str) -> Result<HeaderMap, anyhow::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    Ok(headers)
}

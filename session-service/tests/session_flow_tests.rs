mod common;

use std::time::Duration;

use auth::CookieName;
use auth::SessionCookie;
use auth::TokenClaims;
use chrono::Utc;
use common::TestSession;
use http::header::COOKIE;
use http::HeaderMap;
use http::HeaderValue;
use session_service::session::errors::SessionError;
use session_service::session::models::TokenLifetimes;

const CLEARING: [&str; 2] = [
    "Authentication=; HttpOnly; Path=/; Max-Age=0",
    "Refresh=; HttpOnly; Path=/; Max-Age=0",
];

fn refresh_headers(cookie: &SessionCookie) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("{}={}", CookieName::Refresh, cookie.value))
            .expect("Invalid header value"),
    );
    headers
}

#[tokio::test]
async fn test_login_scenario() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;

    let user = app
        .login
        .validate_user_for_local_strategy("alice", "correct")
        .await
        .expect("Login failed")
        .expect("Expected alice to log in");
    assert_eq!(user.username, "alice");
    assert!(app.stored_user("alice").await.last_login_at.is_some());

    let wrong = app
        .login
        .validate_user_for_local_strategy("alice", "wrong")
        .await
        .expect("Login failed");
    assert!(wrong.is_none());

    let unknown = app
        .login
        .validate_user_for_local_strategy("bob", "anything")
        .await
        .expect("Login failed");
    assert!(unknown.is_none());
}

#[tokio::test]
async fn test_rejected_login_leaves_last_login_untouched() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;

    app.login
        .validate_user_for_local_strategy("alice", "wrong")
        .await
        .expect("Login failed");

    assert_eq!(app.stored_user("alice").await.last_login_at, None);
}

#[tokio::test]
async fn test_access_cookie_format_and_claims() {
    let app = TestSession::spawn().await;

    let cookie = app
        .login
        .get_cookie_with_jwt_token("alice")
        .expect("Failed to issue cookie");

    assert_eq!(
        cookie.to_header_value(),
        format!(
            "Authentication={}; HttpOnly; Path=/; Max-Age={}",
            cookie.value, app.lifetimes.access_seconds
        )
    );
    assert_eq!(
        app.login.verify_access_token(&cookie.value),
        Ok(TokenClaims::new("alice"))
    );
}

#[tokio::test]
async fn test_access_token_expires() {
    let app = TestSession::with_lifetimes(TokenLifetimes {
        access_seconds: 1,
        refresh_seconds: 1,
    })
    .await;

    let cookie = app
        .login
        .get_cookie_with_jwt_token("alice")
        .expect("Failed to issue cookie");
    assert!(app.login.verify_access_token(&cookie.value).is_ok());

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let result = app.login.verify_access_token(&cookie.value);
    assert!(matches!(result, Err(SessionError::TokenInvalid(_))));
}

#[tokio::test]
async fn test_out_of_range_lifetime_is_a_signing_error() {
    let app = TestSession::with_lifetimes(TokenLifetimes {
        access_seconds: 10_000_000_000_000_000,
        refresh_seconds: 10_000_000_000_000_000,
    })
    .await;
    app.create_user("alice", "correct").await;

    let access = app.login.get_cookie_with_jwt_token("alice");
    assert!(matches!(access, Err(SessionError::Token(_))));

    let refresh = app.login.get_cookie_with_jwt_refresh_token("alice").await;
    assert!(matches!(refresh, Err(SessionError::Token(_))));
    assert_eq!(app.stored_user("alice").await.refresh_token_hash, None);
}

#[tokio::test]
async fn test_refresh_cookie_persists_only_the_hash() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;

    let cookie = app
        .login
        .get_cookie_with_jwt_refresh_token("alice")
        .await
        .expect("Failed to issue cookie");

    assert!(cookie
        .to_header_value()
        .ends_with(&format!("; HttpOnly; Path=/; Max-Age={}", app.lifetimes.refresh_seconds)));

    let stored = app
        .stored_user("alice")
        .await
        .refresh_token_hash
        .expect("Refresh hash missing");
    assert_ne!(stored, cookie.value);
    assert!(!stored.contains(&cookie.value));

    let matched = app
        .login
        .get_user_if_refresh_token_matches(&cookie.value, "alice")
        .await
        .expect("Match failed");
    assert_eq!(matched.map(|u| u.username), Some("alice".to_string()));

    let mismatched = app
        .login
        .get_user_if_refresh_token_matches("wrong", "alice")
        .await
        .expect("Match failed");
    assert!(mismatched.is_none());
}

#[tokio::test]
async fn test_new_refresh_token_replaces_previous() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;

    let first = app
        .login
        .get_cookie_with_jwt_refresh_token("alice")
        .await
        .expect("Failed to issue cookie");
    let second = app
        .login
        .get_cookie_with_jwt_refresh_token("alice")
        .await
        .expect("Failed to issue cookie");

    let old = app
        .login
        .get_user_if_refresh_token_matches(&first.value, "alice")
        .await
        .expect("Match failed");
    let current = app
        .login
        .get_user_if_refresh_token_matches(&second.value, "alice")
        .await
        .expect("Match failed");

    assert!(old.is_none());
    assert!(current.is_some());
}

#[tokio::test]
async fn test_rotation_invalidates_presented_token() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;

    let issued = app
        .login
        .get_cookie_with_jwt_refresh_token("alice")
        .await
        .expect("Failed to issue cookie");

    let session = app
        .authenticator
        .authenticate_refresh(&refresh_headers(&issued))
        .await
        .expect("Rotation failed");

    let [access, refresh] = session.cookies();
    assert!(access.starts_with("Authentication="));
    assert!(refresh.starts_with("Refresh="));
    assert_ne!(session.refresh_cookie.value, issued.value);

    let replay = app
        .authenticator
        .authenticate_refresh(&refresh_headers(&issued))
        .await;
    assert_eq!(replay, Err(SessionError::CredentialMismatch));

    app.authenticator
        .authenticate_refresh(&refresh_headers(&session.refresh_cookie))
        .await
        .expect("Rotated token should be accepted");
}

#[tokio::test]
async fn test_concurrent_rotation_has_one_winner() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;

    let issued = app
        .login
        .get_cookie_with_jwt_refresh_token("alice")
        .await
        .expect("Failed to issue cookie");

    let (first, second) = tokio::join!(
        app.login.rotate_refresh_token(&issued.value),
        app.login.rotate_refresh_token(&issued.value)
    );

    let outcomes = [first, second];
    let winners = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Ok(Some(_))))
        .count();
    assert_eq!(winners, 1);

    for outcome in &outcomes {
        assert!(matches!(
            outcome,
            Ok(Some(_)) | Ok(None) | Err(SessionError::StaleRefreshToken(_))
        ));
    }
}

#[tokio::test]
async fn test_logout_returns_clearing_cookies() {
    let app = TestSession::spawn().await;

    assert_eq!(app.logout.execute(), CLEARING.map(String::from));
}

#[tokio::test]
async fn test_revoke_drops_refresh_token() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;

    let issued = app
        .login
        .get_cookie_with_jwt_refresh_token("alice")
        .await
        .expect("Failed to issue cookie");

    let cookies = app.logout.revoke("alice").await.expect("Revoke failed");
    assert_eq!(cookies, CLEARING.map(String::from));

    let result = app
        .authenticator
        .authenticate_refresh(&refresh_headers(&issued))
        .await;
    assert_eq!(result, Err(SessionError::CredentialMismatch));
}

#[tokio::test]
async fn test_is_authenticated_hides_credentials() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;

    let user = app
        .is_authenticated
        .execute("alice")
        .await
        .expect("Lookup failed");
    let json = serde_json::to_string(&user).expect("Failed to serialize user");

    assert_eq!(user.username, "alice");
    assert!(!json.contains("argon2"));

    let missing = app.is_authenticated.execute("bob").await;
    assert_eq!(missing, Err(SessionError::NotFound("bob".to_string())));
}

#[tokio::test]
async fn test_inactive_users_since() {
    let app = TestSession::spawn().await;
    app.create_user("alice", "correct").await;
    app.create_user("carol", "correct").await;

    app.login
        .validate_user_for_local_strategy("alice", "correct")
        .await
        .expect("Login failed");

    let users = app
        .login
        .inactive_users_since(Utc::now() + chrono::Duration::seconds(1))
        .await
        .expect("Query failed");

    let names: Vec<_> = users.into_iter().map(|u| u.username).collect();
    assert_eq!(names, vec!["alice".to_string()]);
}

//! Authentication utilities library
//!
//! Provides reusable session infrastructure:
//! - Credential hashing (Argon2id) for passwords and refresh-token material
//! - JWT token generation and validation (HS256, exact expiry)
//! - Session cookie formatting and parsing
//!
//! Services define their own ports and adapt these implementations.
//!
//! # Examples
//!
//! ## Credential Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{JwtHandler, TokenClaims};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = handler.encode(&TokenClaims::new("alice"), 3600).unwrap();
//! let decoded: TokenClaims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.username, "alice");
//! ```
//!
//! ## Session Cookies
//! ```
//! use auth::{CookieName, SessionCookie};
//!
//! let cookie = SessionCookie::issue(CookieName::Authentication, "token", 3600);
//! assert_eq!(
//!     cookie.to_string(),
//!     "Authentication=token; HttpOnly; Path=/; Max-Age=3600"
//! );
//! ```

pub mod cookie;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use cookie::clearing_cookies;
pub use cookie::find_cookie;
pub use cookie::CookieName;
pub use cookie::SessionCookie;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;

use thiserror::Error;

/// Error for user directory operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),
}

/// Error for credential hashing operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Hash comparison failed: {0}")]
    ComparisonFailed(String),
}

/// Error for token signing and verification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is expired or invalid: {0}")]
    ExpiredOrInvalidToken(String),

    #[error("Token signing failed: {0}")]
    SigningFailed(String),
}

impl From<auth::JwtError> for TokenError {
    fn from(err: auth::JwtError) -> Self {
        if err.is_rejection() {
            TokenError::ExpiredOrInvalidToken(err.to_string())
        } else {
            TokenError::SigningFailed(err.to_string())
        }
    }
}

/// Top-level error for session operations
///
/// `NotFound`, `CredentialMismatch` and `TokenInvalid` all mean
/// "unauthenticated" to a caller; the rest are infrastructure faults.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("User not found with username: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    CredentialMismatch,

    #[error("Invalid token: {0}")]
    TokenInvalid(TokenError),

    #[error("Refresh token for {0} was rotated concurrently")]
    StaleRefreshToken(String),

    #[error("Hasher error: {0}")]
    Hashing(#[from] HasherError),

    #[error("Token error: {0}")]
    Token(TokenError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::ExpiredOrInvalidToken(_) => SessionError::TokenInvalid(err),
            TokenError::SigningFailed(_) => SessionError::Token(err),
        }
    }
}

impl SessionError {
    /// Whether the caller should answer "unauthenticated" rather than report a fault.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            SessionError::NotFound(_)
                | SessionError::CredentialMismatch
                | SessionError::TokenInvalid(_)
                | SessionError::StaleRefreshToken(_)
        )
    }
}

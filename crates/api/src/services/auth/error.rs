//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::validation::FieldErrors;
use crate::services::tokens::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration fields were rejected.
    #[error("invalid registration: {0}")]
    Validation(FieldErrors),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A presented token could not be used to authenticate.
    #[error("token rejected: {0}")]
    Token(#[source] TokenError),

    /// The refresh token given to logout could not be revoked.
    #[error("logout failed: {0}")]
    Logout(#[source] TokenError),

    /// The token's user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

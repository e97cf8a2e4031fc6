//! Authentication error types.

use thiserror::Error;

use proshop_core::EmailError;

use crate::db::RepositoryError;

/// Errors from authentication and session-token operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email not found or password mismatch. The two cases are
    /// deliberately indistinguishable to the caller.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Registration attempted with an email that already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The submitted email failed structural validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The submitted password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("failed to hash password")]
    PasswordHash,

    /// Session token could not be signed.
    #[error("failed to issue session token")]
    TokenIssue,

    /// No session token was presented.
    #[error("no session token")]
    NoToken,

    /// A session token was presented but is expired, tampered, or
    /// otherwise unparseable.
    #[error("invalid session token")]
    InvalidToken,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

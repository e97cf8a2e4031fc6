//! Unified error handling with Sentry integration.
//!
//! Domain errors are raised at the point of detection and bubble up
//! unchanged; this module is the single place where they become HTTP
//! status codes and JSON bodies. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication or session-token operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Resource not found (including malformed identity references).
    #[error("not found: {0}")]
    NotFound(String),

    /// A request field failed validation.
    #[error("validation failed for field '{field}': {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authenticated but not authorized for this operation.
    #[error("forbidden")]
    Forbidden,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_)
            | Self::Repository(RepositoryError::Database(_) | RepositoryError::DataCorruption(_)) => {
                true
            }
            Self::Auth(err) => matches!(
                err,
                AuthError::PasswordHash | AuthError::TokenIssue | AuthError::Repository(_)
            ),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::NoToken
                | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists
                | AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::PasswordHash | AuthError::TokenIssue | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Repository(err) => match err {
                RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_owned(),
                AuthError::NoToken => "Not authorized, no token".to_owned(),
                AuthError::InvalidToken => "Not authorized, token failed".to_owned(),
                AuthError::UserAlreadyExists => "User already exists".to_owned(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::PasswordHash | AuthError::TokenIssue | AuthError::Repository(_) => {
                    "Internal server error".to_owned()
                }
            },
            Self::Repository(RepositoryError::Conflict(msg)) => capitalize(msg),
            Self::Repository(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Validation { field, message } => format!("Invalid {field}: {message}"),
            Self::Forbidden => "Not authorized as an admin".to_owned(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

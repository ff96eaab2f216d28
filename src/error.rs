use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{auth_service::AuthServiceError, user_service::UserServiceError};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Client-facing error taxonomy. Every variant maps to exactly one status
/// code so callers can branch on the response without parsing messages.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input; the message is safe to show verbatim.
    #[error("{0}")]
    Validation(String),

    /// Duplicate email; distinct status so the UI can suggest signing in.
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials; one fixed message for every credential failure.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No session, or the session has expired.
    #[error("Not authenticated")]
    Unauthenticated,

    /// A valid session pointing at a user that no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// Session-store failure. Fatal to the request, never retried here.
    #[error("Session error: {0}")]
    Session(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
            }
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            ApiError::Session(msg) => {
                tracing::error!(error = %msg, "session store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::EmailTaken => ApiError::Conflict(err.to_string()),
            UserServiceError::UserNotFound => ApiError::UserNotFound,
            UserServiceError::InvalidEmail
            | UserServiceError::MissingFirstName
            | UserServiceError::WeakPassword
            | UserServiceError::InvalidStatus => ApiError::Validation(err.to_string()),
            UserServiceError::HashingError(msg) => ApiError::Internal(msg),
            UserServiceError::RepositoryError(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthServiceError::UserNotFound => ApiError::UserNotFound,
            AuthServiceError::RepositoryError(e) => ApiError::Internal(e.to_string()),
        }
    }
}

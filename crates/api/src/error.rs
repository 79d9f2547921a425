//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures unexpected errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! The response mapping preserves the legacy three-way outcome protocol:
//! success is 200, a referenced entity that does not exist is 404 with a
//! message naming the missing ID, and any unexpected persistence failure is
//! 400 with a generic message whose detail is only logged.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found. The message is sent to the client verbatim and
    /// names the missing ID.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client. The message is sent to the client verbatim.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An operation failed unexpectedly. The client sees `public`; the
    /// underlying error is logged and captured only.
    #[error("{public}")]
    Failure {
        public: String,
        #[source]
        source: RepositoryError,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a repository error, keeping `public` as the client-facing message
    /// for the unexpected-failure branch.
    #[must_use]
    pub fn failure(public: &str, source: RepositoryError) -> Self {
        Self::Failure {
            public: public.to_owned(),
            source,
        }
    }

    fn is_unexpected(&self) -> bool {
        match self {
            Self::Repository(e) | Self::Failure { source: e, .. } => {
                !matches!(e, RepositoryError::NotFound | RepositoryError::Conflict(_))
            }
            Self::Internal(_) => true,
            Self::Auth(e) => matches!(e, AuthError::Hash(_) | AuthError::Repository(_)),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture unexpected errors to Sentry
        if self.is_unexpected() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Repository(e) | Self::Failure { source: e, .. } => match e {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::AccountDisabled => {
                    StatusCode::UNAUTHORIZED
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Repository(e) => match e {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Request failed".to_string(),
            },
            Self::Failure { public, .. } => public.clone(),
            Self::Auth(e) => e.public_message(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Bike with id 4 not found!".to_string());
        assert_eq!(err.to_string(), "Not found: Bike with id 4 not found!");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_entity_maps_to_404() {
        assert_eq!(
            get_status(AppError::Repository(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unexpected_repository_failure_maps_to_400() {
        // The legacy protocol's "unexpected failure" branch is a 400 with a
        // generic message, never a 500.
        let err = AppError::failure(
            "Error when creating a new bike!",
            RepositoryError::Database(sqlx::Error::PoolClosed),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conflict_message_is_forwarded() {
        let err = AppError::Repository(RepositoryError::Conflict(
            "username already exists".to_string(),
        ));
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }
}

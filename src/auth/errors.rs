//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure of a session or authorization operation.
///
/// Messages are safe to show to clients; internal details are logged where
/// the error is created and never carried into the response.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl AuthError {
    /// Log an infrastructure failure and wrap it as an internal error.
    pub fn internal(context: &'static str, e: impl std::fmt::Display) -> Self {
        tracing::error!(error = %e, "{}", context);
        Self::Internal(context)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::NotFound(msg) | AuthError::Unauthorized(msg) | AuthError::Forbidden(msg) => {
                msg
            }
            AuthError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

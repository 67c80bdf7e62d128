//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error body is JSON: `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orders_dashboard_core::{CursorError, ErrorBody, PageRequestError};
use thiserror::Error;

use crate::db::RepositoryError;

/// Message returned to clients when the store fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch orders";

/// Application-level error type for the orders API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Request parameters could not be validated.
    #[error("Bad request: {0}")]
    BadRequest(#[from] PageRequestError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CursorError> for AppError {
    fn from(err: CursorError) -> Self {
        Self::Internal(format!("cursor encoding failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Rejected request");
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => FETCH_FAILED_MESSAGE.to_string(),
            Self::BadRequest(err) => err.to_string(),
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

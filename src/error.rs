//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.
//! Bot handlers return the same type; the dispatcher's error handler logs
//! it and forwards a short notice to the administrator.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Telegram Errors**: Failed Bot API requests
/// - **Authorization Errors**: Non-admin callers
/// - **Resource Errors**: Requested accounts not found
/// - **Validation Errors**: Malformed admin arguments, unknown plans
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A Telegram Bot API request failed.
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// The scheduler could not be created or a job could not be registered.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Caller is not the configured administrator.
    #[error("Not authorized")]
    NotAuthorized,

    /// No account exists for the given chat user id.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Account not found")]
    AccountNotFound,

    /// Plan key is not part of the catalog.
    #[error("Invalid plan key")]
    InvalidPlan,

    /// Admin command arguments could not be parsed.
    #[error("Invalid arguments")]
    InvalidArguments,
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Internal failures (database, Telegram, scheduler) are reported as
/// `internal_error` without details.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotAuthorized => (StatusCode::FORBIDDEN, "not_authorized", self.to_string()),
            AppError::AccountNotFound => {
                (StatusCode::NOT_FOUND, "account_not_found", self.to_string())
            }
            AppError::InvalidPlan | AppError::InvalidArguments => {
                (StatusCode::BAD_REQUEST, "invalid_request", self.to_string())
            }
            AppError::Database(_) | AppError::Telegram(_) | AppError::Scheduler(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

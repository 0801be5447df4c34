use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Subscription is not active")]
    SubscriptionInactive,

    #[error("Trial period has ended")]
    TrialExpired,

    #[error("Subscription has expired")]
    SubscriptionExpired,

    #[error("The {plan} plan allows at most {limit} {resource}")]
    QuotaExceeded {
        plan: String,
        limit: i64,
        resource: &'static str,
    },

    #[error("Room is already booked from {start} to {end} on that date")]
    SlotConflict { start: String, end: String },

    #[error("Cannot schedule a booking in the past")]
    PastSchedule,

    #[error("Room is locked by the current plan and cannot be edited")]
    RoomLocked,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Please wait {wait_secs} seconds before requesting a new code")]
    TooManyRequests { wait_secs: i64 },

    #[error("The code you entered is incorrect")]
    OtpMismatch,

    #[error("The code has expired, request a new one")]
    OtpExpired,

    #[error("Verification session has expired, verify your email again")]
    SessionExpired,

    #[error("Mail delivery failed: {0}")]
    MailDelivery(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Expected control-flow denials are reported to the caller, not logged
    /// as system failures.
    fn is_expected(&self) -> bool {
        !matches!(
            self,
            AppError::Database(_) | AppError::MailDelivery(_) | AppError::Internal(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(err) => match err {
                DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                DatabaseError::Duplicate => (StatusCode::CONFLICT, "Resource already exists"),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, please try again",
                ),
            },
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            AppError::SubscriptionInactive => {
                (StatusCode::FORBIDDEN, "Subscription is not active")
            }
            AppError::TrialExpired => (
                StatusCode::FORBIDDEN,
                "Trial period has ended, please upgrade",
            ),
            AppError::SubscriptionExpired => (
                StatusCode::FORBIDDEN,
                "Subscription has expired, please renew",
            ),
            AppError::QuotaExceeded { .. } => (StatusCode::FORBIDDEN, "Plan limit reached"),
            AppError::SlotConflict { .. } => {
                (StatusCode::CONFLICT, "The requested slot is already booked")
            }
            AppError::PastSchedule => (StatusCode::BAD_REQUEST, "Start time is in the past"),
            AppError::RoomLocked => (StatusCode::CONFLICT, "Room is locked"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::TooManyRequests { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests")
            }
            AppError::OtpMismatch => (StatusCode::BAD_REQUEST, "Incorrect verification code"),
            AppError::OtpExpired => (StatusCode::BAD_REQUEST, "Verification code expired"),
            AppError::SessionExpired => (StatusCode::UNAUTHORIZED, "Verification session expired"),
            AppError::MailDelivery(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, please try again",
            ),
        };

        if !self.is_expected() {
            tracing::error!("request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

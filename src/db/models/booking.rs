use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

/// `Booked -> Cancelled` is terminal; a reschedule mutates the time window
/// and stays `Booked` after re-passing the conflict check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(unused)]
pub enum BookingStatus {
    Booked,
    Cancelled,
    Rescheduled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "BOOKED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Rescheduled => "RESCHEDULED",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Booking {
    pub id: i64,
    pub tenant_id: i64,
    pub room_id: i64,
    pub booking_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub booked_by: String,
    pub contact_email: Option<String>,
    pub purpose: Option<String>,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewBooking {
    pub room_id: i64,
    /// `YYYY-MM-DD`
    #[validate(length(min = 10, max = 10, message = "Date must be YYYY-MM-DD"))]
    pub date: String,
    /// `H:MM AM/PM`
    #[validate(length(min = 1, message = "Start time must not be empty"))]
    pub start_time: String,
    #[validate(length(min = 1, message = "End time must not be empty"))]
    pub end_time: String,
    #[validate(length(min = 1, message = "Booked-by must not be empty"))]
    pub booked_by: String,
    /// Optional address for the best-effort booking notification mail.
    #[validate(email(message = "Invalid email address"))]
    pub contact_email: Option<String>,
    pub purpose: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RescheduleBooking {
    #[validate(length(min = 10, max = 10, message = "Date must be YYYY-MM-DD"))]
    pub date: String,
    #[validate(length(min = 1, message = "Start time must not be empty"))]
    pub start_time: String,
    #[validate(length(min = 1, message = "End time must not be empty"))]
    pub end_time: String,
}

use serde::Deserialize;
use time::OffsetDateTime;
use validator::Validate;

use super::NewVisitor;

#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(unused)]
pub struct OtpSession {
    pub id: i64,
    pub tenant_id: i64,
    pub email: String,
    pub code_hash: String,
    pub expires_at: OffsetDateTime,
    pub verified: bool,
    pub session_token: Option<String>,
    pub verified_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterVisitorPayload {
    #[validate(length(min = 1, message = "Session token must not be empty"))]
    pub session_token: String,
    #[validate(nested)]
    pub visitor: NewVisitor,
}

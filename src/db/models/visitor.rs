use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(unused)]
pub enum VisitorStatus {
    In,
    Out,
}

#[allow(unused)]
impl VisitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorStatus::In => "IN",
            VisitorStatus::Out => "OUT",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Visitor {
    pub id: i64,
    pub tenant_id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub visitor_code: Option<String>,
    pub photo_url: Option<String>,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub check_in_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub check_out_at: Option<OffsetDateTime>,
    pub pass_mail_sent: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewVisitor {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub full_name: String,
    #[validate(length(min = 4, message = "Phone must be at least 4 characters"))]
    pub phone: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// JPEG bytes, base64 encoded. Uploaded to blob storage under the
    /// derived visitor code.
    pub photo_base64: Option<String>,
}

/// What check-in hands back to the kiosk: the issued code plus echoed
/// contact fields.
#[derive(Debug, Serialize)]
pub struct VisitorPass {
    pub id: i64,
    pub visitor_code: String,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub status: VisitorStatus,
}

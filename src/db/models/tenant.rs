use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

/// Subscription tier. Unknown values written by the billing collaborator
/// normalize to `Trial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Trial,
    Business,
    Enterprise,
}

impl Plan {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "business" => Plan::Business,
            "enterprise" => Plan::Enterprise,
            _ => Plan::Trial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Trial => "trial",
            Plan::Business => "business",
            Plan::Enterprise => "enterprise",
        }
    }
}

/// Subscription status, owned by the billing collaborator. Unknown values
/// normalize to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Trial,
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trial" => SubscriptionStatus::Trial,
            "active" => SubscriptionStatus::Active,
            "expired" => SubscriptionStatus::Expired,
            "cancelled" => SubscriptionStatus::Cancelled,
            _ => SubscriptionStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub plan: String,
    pub subscription_status: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub trial_ends_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub subscription_ends_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Tenant {
    pub fn plan(&self) -> Plan {
        Plan::parse(&self.plan)
    }

    pub fn status(&self) -> SubscriptionStatus {
        SubscriptionStatus::parse(&self.subscription_status)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewTenant {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTenantLogo {
    #[validate(length(min = 1, message = "Logo payload must not be empty"))]
    pub image_base64: String,
    #[validate(length(min = 1, message = "Extension must not be empty"))]
    pub extension: String,
}

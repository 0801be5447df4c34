use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Verified identity supplied by the authentication gateway in front of this
/// service. The core trusts these headers completely and never re-derives
/// identity downstream.
#[derive(Debug, Clone)]
#[allow(unused)]
pub struct AuthContext {
    pub tenant_id: i64,
    pub user_id: i64,
    pub role: String,
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &'static str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| AppError::Authentication(format!("missing {} header", name)))
        };

        let tenant_id = header("x-tenant-id")?
            .parse::<i64>()
            .map_err(|_| AppError::Authentication("invalid x-tenant-id header".into()))?;
        let user_id = header("x-user-id")?
            .parse::<i64>()
            .map_err(|_| AppError::Authentication("invalid x-user-id header".into()))?;
        let role = parts
            .headers
            .get("x-role")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("member")
            .to_string();

        Ok(AuthContext {
            tenant_id,
            user_id,
            role,
        })
    }
}

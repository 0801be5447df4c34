use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{NewTenant, Tenant, UpdateTenantLogo};
use crate::error::AppResult;
use crate::extract::AuthContext;
use crate::services::tenant;

/// Self-service company registration; the tenant starts on the trial plan.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewTenant>,
) -> AppResult<(StatusCode, Json<Tenant>)> {
    payload.validate()?;
    let created = tenant::register_tenant(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthContext,
) -> AppResult<Json<Tenant>> {
    Ok(Json(tenant::get_tenant(&state.db, auth.tenant_id).await?))
}

pub async fn update_logo(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<UpdateTenantLogo>,
) -> AppResult<Json<Tenant>> {
    payload.validate()?;
    let updated =
        tenant::update_logo(&state.db, state.storage.as_ref(), auth.tenant_id, payload).await?;
    Ok(Json(updated))
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{RegisterVisitorPayload, SendOtpPayload, VerifyOtpPayload, VisitorPass};
use crate::error::AppResult;
use crate::services::{otp, tenant};

/// Start the email challenge for self-registration at a tenant's kiosk page.
pub async fn send_otp(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<SendOtpPayload>,
) -> AppResult<Json<serde_json::Value>> {
    payload.validate()?;
    let tenant = tenant::get_tenant_by_slug(&state.db, &slug).await?;
    otp::send_otp(&state.db, state.mailer.as_ref(), &tenant, &payload.email).await?;
    Ok(Json(json!({ "status": "sent" })))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<VerifyOtpPayload>,
) -> AppResult<Json<serde_json::Value>> {
    payload.validate()?;
    let tenant = tenant::get_tenant_by_slug(&state.db, &slug).await?;
    let token = otp::verify_otp(&state.db, tenant.id, &payload.email, &payload.code).await?;
    Ok(Json(json!({ "session_token": token })))
}

/// Final registration step, gated on the single-use session token.
pub async fn register_visitor(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<RegisterVisitorPayload>,
) -> AppResult<(StatusCode, Json<VisitorPass>)> {
    payload.validate()?;
    let tenant = tenant::get_tenant_by_slug(&state.db, &slug).await?;
    let pass = otp::register_visitor(
        &state.db,
        state.mailer.as_ref(),
        state.storage.as_ref(),
        &tenant,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(pass)))
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{NewVisitor, Visitor, VisitorPass};
use crate::error::AppResult;
use crate::extract::AuthContext;
use crate::services::visitor;

/// Front-desk check-in.
pub async fn check_in(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<NewVisitor>,
) -> AppResult<(StatusCode, Json<VisitorPass>)> {
    payload.validate()?;
    let pass = visitor::check_in(
        &state.db,
        state.mailer.as_ref(),
        state.storage.as_ref(),
        auth.tenant_id,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(pass)))
}

pub async fn list_today(
    State(state): State<AppState>,
    auth: AuthContext,
) -> AppResult<Json<Vec<Visitor>>> {
    Ok(Json(visitor::list_today(&state.db, auth.tenant_id).await?))
}

pub async fn get_visitor(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(code): Path<String>,
) -> AppResult<Json<Visitor>> {
    Ok(Json(
        visitor::get_by_code(&state.db, auth.tenant_id, &code).await?,
    ))
}

pub async fn check_out(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(code): Path<String>,
) -> AppResult<StatusCode> {
    visitor::check_out(&state.db, auth.tenant_id, &code).await?;
    Ok(StatusCode::NO_CONTENT)
}

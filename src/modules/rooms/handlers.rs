use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{NewRoom, Room, UpdateRoom};
use crate::error::AppResult;
use crate::extract::AuthContext;
use crate::services::room;

pub async fn create_room(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<NewRoom>,
) -> AppResult<(StatusCode, Json<Room>)> {
    payload.validate()?;
    let created = room::create_room(&state.db, auth.tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Locked rooms are listed too; `is_active` tells them apart.
pub async fn list_rooms(
    State(state): State<AppState>,
    auth: AuthContext,
) -> AppResult<Json<Vec<Room>>> {
    Ok(Json(room::list_rooms(&state.db, auth.tenant_id).await?))
}

pub async fn update_room(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(room_id): Path<i64>,
    Json(payload): Json<UpdateRoom>,
) -> AppResult<Json<Room>> {
    payload.validate()?;
    let updated = room::update_room(&state.db, auth.tenant_id, room_id, payload).await?;
    Ok(Json(updated))
}

pub async fn delete_room(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(room_id): Path<i64>,
) -> AppResult<StatusCode> {
    room::delete_room(&state.db, auth.tenant_id, room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn sync_rooms(
    State(state): State<AppState>,
    auth: AuthContext,
) -> AppResult<StatusCode> {
    room::sync_rooms(&state.db, auth.tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{Booking, NewBooking, RescheduleBooking};
use crate::error::AppResult;
use crate::extract::AuthContext;
use crate::services::booking;

pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<NewBooking>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    payload.validate()?;
    let created =
        booking::create_booking(&state.db, state.mailer.as_ref(), auth.tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(booking_id): Path<i64>,
) -> AppResult<Json<Booking>> {
    Ok(Json(
        booking::get_booking(&state.db, auth.tenant_id, booking_id).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub date: String,
}

pub async fn list_room_bookings(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(room_id): Path<i64>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let date = booking::parse_date(&query.date)?;
    let bookings = booking::list_for_room(&state.db, auth.tenant_id, room_id, date).await?;
    Ok(Json(bookings))
}

pub async fn reschedule_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(booking_id): Path<i64>,
    Json(payload): Json<RescheduleBooking>,
) -> AppResult<Json<Booking>> {
    payload.validate()?;
    let updated = booking::reschedule_booking(
        &state.db,
        state.mailer.as_ref(),
        auth.tenant_id,
        booking_id,
        payload,
    )
    .await?;
    Ok(Json(updated))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(booking_id): Path<i64>,
) -> AppResult<Json<Booking>> {
    let cancelled =
        booking::cancel_booking(&state.db, state.mailer.as_ref(), auth.tenant_id, booking_id)
            .await?;
    Ok(Json(cancelled))
}

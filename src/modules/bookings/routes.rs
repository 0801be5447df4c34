use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    cancel_booking, create_booking, get_booking, list_room_bookings, reschedule_booking,
};
use crate::app_state::AppState;

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route(
            "/bookings/{id}",
            get(get_booking).put(reschedule_booking).delete(cancel_booking),
        )
        .route("/rooms/{id}/bookings", get(list_room_bookings))
}

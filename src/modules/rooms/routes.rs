use axum::{
    routing::{post, put},
    Router,
};

use super::handlers::{create_room, delete_room, list_rooms, sync_rooms, update_room};
use crate::app_state::AppState;

pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room).get(list_rooms))
        .route("/rooms/sync", post(sync_rooms))
        .route("/rooms/{id}", put(update_room).delete(delete_room))
}

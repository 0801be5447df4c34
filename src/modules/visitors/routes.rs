use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{check_in, check_out, get_visitor, list_today};
use crate::app_state::AppState;

pub fn visitor_routes() -> Router<AppState> {
    Router::new()
        .route("/visitors", post(check_in))
        .route("/visitors/today", get(list_today))
        .route("/visitors/{code}", get(get_visitor))
        .route("/visitors/{code}/checkout", post(check_out))
}

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{me, register, update_logo};
use crate::app_state::AppState;

pub fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/tenants", post(register))
        .route("/tenants/me", get(me))
        .route("/tenants/me/logo", put(update_logo))
}

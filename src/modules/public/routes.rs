use axum::{routing::post, Router};

use super::handlers::{register_visitor, send_otp, verify_otp};
use crate::app_state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/{slug}/otp/send", post(send_otp))
        .route("/{slug}/otp/verify", post(verify_otp))
        .route("/{slug}/register", post(register_visitor))
}

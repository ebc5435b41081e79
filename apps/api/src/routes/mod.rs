pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::workflow::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/remix",
            post(handlers::handle_generate).get(handlers::handle_get_session),
        )
        .route("/api/v1/remix/:index/save", post(handlers::handle_save))
        .route("/api/v1/remix/:index/hide", post(handlers::handle_hide))
        .route("/api/v1/saved", get(handlers::handle_get_saved))
        .route("/api/v1/share", get(handlers::handle_share))
        .route(
            "/api/v1/preferences",
            put(handlers::handle_put_preferences).get(handlers::handle_get_preferences),
        )
        .with_state(state)
}

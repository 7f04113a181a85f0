pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::lesson::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Lesson API
        .route(
            "/api/v1/lessons/generate",
            post(handlers::handle_generate_lesson),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

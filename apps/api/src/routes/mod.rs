pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyses", post(handlers::handle_analyze))
        .route(
            "/api/v1/analyses/keywords",
            post(handlers::handle_keyword_preview),
        )
        .with_state(state)
}

pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::enhancement::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/bands", get(handlers::handle_list_bands))
        .route("/api/v1/enhance", post(handlers::handle_enhance))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/band",
            patch(handlers::handle_update_band),
        )
        .route(
            "/api/v1/sessions/:id/enhance",
            post(handlers::handle_session_enhance),
        )
        .with_state(state)
}

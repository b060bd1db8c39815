use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:session_id", delete(handlers::delete_session))
        .route("/sessions/:session_id/clear", post(handlers::clear_session))
        // Turn control
        .route(
            "/sessions/:session_id/record/start",
            post(handlers::start_recording),
        )
        .route(
            "/sessions/:session_id/record/stop",
            post(handlers::stop_recording),
        )
        .route("/sessions/:session_id/audio", post(handlers::push_audio))
        .route(
            "/sessions/:session_id/question",
            post(handlers::next_question),
        )
        // Session queries
        .route(
            "/sessions/:session_id/snapshot",
            get(handlers::get_snapshot),
        )
        .route("/sessions/:session_id/log", get(handlers::get_log))
        .route(
            "/sessions/:session_id/recording",
            get(handlers::get_recording),
        )
        // Progress
        .route("/users/:user_id/progress", get(handlers::get_progress))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

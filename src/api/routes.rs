use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

/// Request bodies are a topic name and a short feedback string.
const MAX_BODY_BYTES: usize = 16 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages (query parameters pick the view)
        .route("/", get(handlers::index))
        .route("/assets/style.css", get(handlers::stylesheet))
        // Topics
        .route(
            "/api/topics",
            get(handlers::list_topics).post(handlers::add_topic),
        )
        // Feedback
        .route(
            "/api/feedback",
            get(handlers::list_feedback).post(handlers::submit_feedback),
        )
        .route("/api/export", get(handlers::export_csv))
        // Instructor dashboard
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/qr", get(handlers::topic_qr))
        // Admin
        .route("/api/reset", post(handlers::reset))
        .route("/_internal/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

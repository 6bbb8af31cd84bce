//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for the browser renderer.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// CORS allows any origin so the renderer can be served from a separate
/// dev server.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/events", get(ws::ws_events))
        // Reads
        .route("/api/state", get(handlers::get_state))
        .route("/api/history", get(handlers::get_history))
        .route("/api/posts", get(handlers::get_posts))
        .route("/api/presentation", get(handlers::get_presentation))
        .route("/api/snapshot", get(handlers::get_snapshot))
        // Controls
        .route("/api/session/start", post(handlers::start_session))
        .route("/api/session/submit", post(handlers::submit))
        .route("/api/session/reset", post(handlers::reset_session))
        .route("/api/posts/{id}/dismiss", post(handlers::dismiss_post))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

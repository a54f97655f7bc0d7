//! HTTP API module
//!
//! Local control surface for the session: status, timer writes, settings
//! and pause/resume.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::tasks::SessionController;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(session: Arc<SessionController>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/timer", post(set_timer_handler))
        .route("/timer/stop", post(stop_timer_handler))
        .route("/settings/name", put(rename_handler))
        .route("/settings/default-length", put(default_length_handler))
        .route("/session/pause", post(pause_handler))
        .route("/session/resume", post(resume_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(session)
}

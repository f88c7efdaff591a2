//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod builds;
pub mod error;
pub mod health;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};
use quay_runner::BuildJob;
use quay_runner::repository::BuildStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BuildStore>,
    pub job: Arc<BuildJob>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Build triggers
        .route("/webhook", post(webhook::receive_push))
        // Build queries
        .route("/builds", get(builds::list_builds))
        .route("/build/{job_id}", get(builds::get_build))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

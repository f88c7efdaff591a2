//! Build API Handlers
//!
//! Read-only endpoints over stored build records.

use axum::{
    Json,
    extract::{Path, State},
};
use quay_core::domain::build::BuildRecord;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// GET /builds
/// List every build record
pub async fn list_builds(State(state): State<AppState>) -> ApiResult<Json<Vec<BuildRecord>>> {
    tracing::debug!("Listing all builds");

    let builds = state.store.list().await?;
    Ok(Json(builds))
}

/// GET /build/{job_id}
/// Get one build record
pub async fn get_build(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<BuildRecord>> {
    tracing::debug!("Getting build: {}", job_id);

    state
        .store
        .get(&job_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Build {} not found", job_id)))
}

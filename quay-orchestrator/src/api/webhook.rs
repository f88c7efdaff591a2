//! Webhook API Handler
//!
//! Turns push events into pipeline runs.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quay_core::dto::webhook::{PushEvent, WebhookAccepted};
use quay_runner::RunRequest;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /webhook
/// Start a build for a push event
///
/// The run continues in the background after the response is sent. Pushes
/// that delete a branch are acknowledged without a run.
pub async fn receive_push(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let event: PushEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid push event: {}", e)))?;

    if event.deleted {
        tracing::info!("Ignoring deletion of {}", event.git_ref);
        return Ok(StatusCode::OK.into_response());
    }

    let request = run_request(&event, Uuid::new_v4().to_string())?;
    let job_id = request.job_id.clone();
    tracing::info!(
        "Accepted push of {} to {} as job {}",
        request.commit_sha,
        request.repo_slug(),
        job_id
    );

    let job = state.job.clone();
    tokio::spawn(async move {
        job.run(request).await;
    });

    Ok((StatusCode::ACCEPTED, Json(WebhookAccepted { job_id })).into_response())
}

/// Extracts the run parameters from a push event
fn run_request(event: &PushEvent, job_id: String) -> ApiResult<RunRequest> {
    let owner = event
        .owner()
        .ok_or_else(|| ApiError::BadRequest("Push event has no repository owner".to_string()))?;

    Ok(RunRequest {
        job_id,
        clone_url: event.repository.clone_url.clone(),
        branch_ref: event.git_ref.clone(),
        owner: owner.to_string(),
        repo: event.repository.name.clone(),
        commit_sha: event.after.clone(),
    })
}

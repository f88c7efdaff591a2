//! Execution types for a pipeline run
//!
//! These types only exist while a run is in progress. The persisted outcome
//! of a run is a [`quay_core::domain::build::BuildRecord`].

use quay_core::domain::build::BuildResult;
use serde::{Deserialize, Serialize};

/// Everything needed to start one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Unique ID of the run, chosen by the caller
    ///
    /// Used as the storage key and as the checkout directory name.
    pub job_id: String,
    pub clone_url: String,
    pub branch_ref: String,
    pub owner: String,
    pub repo: String,
    pub commit_sha: String,
}

impl RunRequest {
    /// `owner/repo`
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Progress of a pipeline run
///
/// `Success`, `Failure` and `Error` are terminal; exactly one is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Cloning,
    ConfigDiscovery,
    Executing,
    Success,
    Failure,
    Error,
}

impl From<BuildResult> for PipelineState {
    fn from(result: BuildResult) -> Self {
        match result {
            BuildResult::Pending => PipelineState::Pending,
            BuildResult::Success => PipelineState::Success,
            BuildResult::Failure => PipelineState::Failure,
            BuildResult::Error => PipelineState::Error,
        }
    }
}

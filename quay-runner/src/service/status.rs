//! Commit status reporting
//!
//! Reporting is best-effort: a status that cannot be sent is logged and the
//! pipeline carries on. Nothing here returns an error to the caller.

use async_trait::async_trait;
use quay_client::{CredentialSource, StatusClient};
use quay_core::domain::build::BuildResult;
use quay_core::dto::status::{CommitStatus, job_details_url};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default label identifying Quay in the list of commit checks
pub const DEFAULT_STATUS_CONTEXT: &str = "quay-ci";

/// Publishes the state of a build for a commit
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// Reports `result` for `owner/repo@commit_sha`
    ///
    /// Failures are logged by the implementation and never surfaced.
    async fn report(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        result: BuildResult,
        job_id: &str,
    );
}

/// Reports build states to the GitHub commit status API
pub struct GitHubStatusReporter {
    client: StatusClient,
    credentials: Arc<dyn CredentialSource>,
    details_url: String,
    context: String,
}

impl GitHubStatusReporter {
    /// Creates a reporter
    ///
    /// # Arguments
    /// * `client` - Status API client
    /// * `credentials` - Source of the bearer token
    /// * `details_url` - Base URL of the build detail pages
    /// * `context` - Label shown next to the commit status
    pub fn new(
        client: StatusClient,
        credentials: Arc<dyn CredentialSource>,
        details_url: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            details_url: details_url.into(),
            context: context.into(),
        }
    }

    /// Status payload for a build of `job_id`
    pub fn status_for(&self, result: BuildResult, job_id: &str) -> CommitStatus {
        CommitStatus::new(
            result,
            job_details_url(&self.details_url, job_id),
            self.context.clone(),
        )
    }
}

#[async_trait]
impl StatusReporter for GitHubStatusReporter {
    async fn report(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        result: BuildResult,
        job_id: &str,
    ) {
        let Some(token) = self.credentials.token() else {
            debug!("No status API token available, skipping {} status", result);
            return;
        };

        let status = self.status_for(result, job_id);
        match self
            .client
            .create_status(owner, repo, commit_sha, &token, &status)
            .await
        {
            Ok(()) => debug!(
                "Reported {} for {}/{}@{}",
                result, owner, repo, commit_sha
            ),
            Err(e) => warn!(
                "Failed to report {} status for {}/{}@{}: {}",
                result, owner, repo, commit_sha, e
            ),
        }
    }
}

/// Reporter that drops every status
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

#[async_trait]
impl StatusReporter for NoopReporter {
    async fn report(
        &self,
        _owner: &str,
        _repo: &str,
        _commit_sha: &str,
        result: BuildResult,
        job_id: &str,
    ) {
        debug!("Status reporting disabled, dropping {} for job {}", result, job_id);
    }
}

//! Commit status API client

use quay_core::dto::status::CommitStatus;
use reqwest::{Client, Request};

use crate::error::Result;
use crate::handle_empty_response;

/// Client for the per-commit status endpoint
/// (`POST {api_url}/repos/{owner}/{repo}/statuses/{sha}`)
#[derive(Debug, Clone)]
pub struct StatusClient {
    api_url: String,
    client: Client,
}

impl StatusClient {
    /// Create a new status client
    ///
    /// # Arguments
    /// * `api_url` - Base URL of the status API (e.g., "https://api.github.com")
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(api_url, Client::new())
    }

    pub fn with_client(api_url: impl Into<String>, client: Client) -> Self {
        let api_url = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Status endpoint for one commit
    pub fn status_url(&self, owner: &str, repo: &str, sha: &str) -> String {
        format!("{}/repos/{}/{}/statuses/{}", self.api_url, owner, repo, sha)
    }

    /// Builds the authenticated status request without sending it
    pub fn build_request(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        token: &str,
        status: &CommitStatus,
    ) -> Result<Request> {
        let request = self
            .client
            .post(self.status_url(owner, repo, sha))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "quay-ci")
            .json(status)
            .build()?;

        Ok(request)
    }

    /// Sets the status of a commit
    pub async fn create_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        token: &str,
        status: &CommitStatus,
    ) -> Result<()> {
        let request = self.build_request(owner, repo, sha, token, status)?;
        let response = self.client.execute(request).await?;

        handle_empty_response(response).await
    }
}

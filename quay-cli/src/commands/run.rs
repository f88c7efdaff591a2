//! Run command handler
//!
//! Runs one pipeline on this machine with an in-memory build store.

use anyhow::Result;
use clap::Args;
use colored::*;
use quay_client::{StatusClient, TokenFile};
use quay_core::domain::build::BuildResult;
use quay_runner::repository::InMemoryBuildStore;
use quay_runner::service::status::DEFAULT_STATUS_CONTEXT;
use quay_runner::service::{GitCheckout, GitHubStatusReporter, NoopReporter, StatusReporter};
use quay_runner::{BuildJob, JobSettings, RunRequest};
use std::path::PathBuf;
use std::sync::Arc;

use crate::output::print_build_details;

/// Arguments of `quay run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// URL to clone the repository from
    #[arg(long)]
    pub clone_url: String,

    /// Branch or ref to build
    #[arg(long)]
    pub branch: String,

    /// Repository owner
    #[arg(long)]
    pub owner: String,

    /// Repository name
    #[arg(long)]
    pub repo: String,

    /// Commit being built
    #[arg(long)]
    pub sha: String,

    /// Job ID (generated when omitted)
    #[arg(long)]
    pub job_id: Option<String>,

    /// Directory the repository is checked out under
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// File holding a status API token; statuses are only reported when set
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// Base URL of the commit status API
    #[arg(long, default_value = "https://api.github.com")]
    pub status_api_url: String,

    /// Base URL of the build detail pages
    #[arg(long, default_value = "http://localhost:3000")]
    pub details_url: String,
}

impl RunArgs {
    fn into_request(self) -> (RunRequest, JobSettings, Arc<dyn StatusReporter>) {
        let reporter: Arc<dyn StatusReporter> = match &self.token_file {
            Some(path) => Arc::new(GitHubStatusReporter::new(
                StatusClient::new(self.status_api_url.clone()),
                Arc::new(TokenFile::new(path.clone())),
                self.details_url.clone(),
                DEFAULT_STATUS_CONTEXT,
            )),
            None => Arc::new(NoopReporter),
        };

        let settings = JobSettings {
            workspace_dir: self.workspace,
            details_url: self.details_url,
        };

        let request = RunRequest {
            job_id: self
                .job_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            clone_url: self.clone_url,
            branch_ref: self.branch,
            owner: self.owner,
            repo: self.repo,
            commit_sha: self.sha,
        };

        (request, settings, reporter)
    }
}

/// Handle the run command
///
/// Fails when the build does not succeed so the exit status reflects it.
pub async fn handle_run_command(args: RunArgs) -> Result<()> {
    let (request, settings, reporter) = args.into_request();

    println!(
        "{} {} ({}@{})",
        "▸ Running job".bold(),
        request.job_id.cyan(),
        request.repo_slug(),
        request.commit_sha.dimmed()
    );

    let job = BuildJob::new(
        Arc::new(GitCheckout::new()),
        Arc::new(InMemoryBuildStore::new()),
        reporter,
        settings,
    );
    let record = job.run(request).await;

    println!();
    print_build_details(&record);

    match record.result {
        BuildResult::Success => Ok(()),
        result => anyhow::bail!("Build {} finished with {}", record.job_id, result),
    }
}

//! Build job pipeline
//!
//! Runs one build from start to finish:
//! 1. Persist and report a pending record
//! 2. Clone the pushed branch
//! 3. Load the build config from the checkout root
//! 4. Run the Build command, then the Test command
//! 5. Classify the outcome, report it and persist the final record
//!
//! Every failure is handled at the step where it happens. A run always ends
//! in exactly one of Success, Failure or Error and never returns an error.

use quay_core::domain::build::{BuildRecord, BuildResult, completion_timestamp};
use quay_core::domain::log::Log;
use quay_core::dto::status::job_details_url;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::execution::{PipelineState, RunRequest};
use crate::repository::BuildStore;
use crate::service::config_file::{ConfigError, load_build_config};
use crate::service::{SourceCheckout, StatusReporter};

pub const BUILD_FAILED: &str = "Build failed, exit-value was non-zero";
pub const TESTS_FAILED: &str = "Tests failed, exit-value was non-zero";
pub const BUILD_FILE_FOUND: &str = "Found build file.";
pub const BUILD_FILE_MISSING: &str = "Failed to find a build file.";
pub const INTERNAL_ISSUE: &str = "Internal issue. Contact support.";

/// Settings shared by every run of a [`BuildJob`]
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Directory holding one checkout directory per job
    pub workspace_dir: PathBuf,
    /// Base URL of the build detail pages
    pub details_url: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("."),
            details_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Pipeline runner with its collaborators
///
/// Cheap to share behind an `Arc`; every call to [`BuildJob::run`] is an
/// independent run and many can be in flight at once as long as their job
/// IDs differ.
pub struct BuildJob {
    checkout: Arc<dyn SourceCheckout>,
    store: Arc<dyn BuildStore>,
    reporter: Arc<dyn StatusReporter>,
    settings: JobSettings,
}

/// Log and state of the run in progress
struct Run<'a> {
    request: &'a RunRequest,
    log: Log,
    state: PipelineState,
}

impl<'a> Run<'a> {
    fn new(request: &'a RunRequest) -> Self {
        Self {
            request,
            log: Log::new(),
            state: PipelineState::Pending,
        }
    }

    /// Appends a line to the run log and mirrors it to the console
    fn log_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{}", line);
        self.log.push_line(line);
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl BuildJob {
    /// Creates a pipeline runner
    ///
    /// # Arguments
    /// * `checkout` - Clones the repository under test
    /// * `store` - Persists build records
    /// * `reporter` - Publishes commit statuses
    /// * `settings` - Workspace location and detail page URL
    pub fn new(
        checkout: Arc<dyn SourceCheckout>,
        store: Arc<dyn BuildStore>,
        reporter: Arc<dyn StatusReporter>,
        settings: JobSettings,
    ) -> Self {
        Self {
            checkout,
            store,
            reporter,
            settings,
        }
    }

    /// Runs the pipeline for one commit
    ///
    /// # Returns
    /// The terminal build record, which has also been reported and persisted
    pub async fn run(&self, request: RunRequest) -> BuildRecord {
        let span = info_span!("build_job", job_id = %request.job_id);
        self.run_to_completion(&request).instrument(span).await
    }

    async fn run_to_completion(&self, request: &RunRequest) -> BuildRecord {
        let mut run = Run::new(request);
        run.log_line(format!("Running build job with id {}", request.job_id));

        let pending = BuildRecord::pending(&request.job_id, &request.commit_sha, run.log.clone());
        self.reporter
            .report(
                &request.owner,
                &request.repo,
                &request.commit_sha,
                BuildResult::Pending,
                &request.job_id,
            )
            .await;

        // Without a pending record the job is invisible, so it cannot go on
        if let Err(e) = self.store.post(&pending).await {
            error!("Failed to persist pending build {}: {}", request.job_id, e);
            run.log_line(INTERNAL_ISSUE);
            return self.finish(run, BuildResult::Error).await;
        }

        let result = self.execute(&mut run).await;
        self.finish(run, result).await
    }

    /// Checkout, config discovery, stage execution and classification
    async fn execute(&self, run: &mut Run<'_>) -> BuildResult {
        let request = run.request;

        run.transition(PipelineState::Cloning);
        run.log_line("Cloning repository.");

        let target = self.settings.workspace_dir.join(&request.job_id);
        let root = match self
            .checkout
            .checkout(&request.clone_url, &request.branch_ref, &target)
            .await
        {
            Ok(root) => root,
            Err(e) => {
                warn!("Checkout failed: {}", e);
                run.log_line(format!("Failed to clone repository {}", request.clone_url));
                return BuildResult::Error;
            }
        };

        run.transition(PipelineState::ConfigDiscovery);
        let config = match load_build_config(&root).await {
            Ok(config) => config,
            Err(ConfigError::NotFound(path)) => {
                debug!("No build config at {}", path.display());
                run.log_line(BUILD_FILE_MISSING);
                return BuildResult::Error;
            }
            Err(e @ ConfigError::Read { .. }) => {
                run.log_line(format!("Failed to read build file: {}", e));
                return BuildResult::Error;
            }
            Err(ConfigError::Malformed(reason)) => {
                run.log_line(format!("Malformed build file: {}", reason));
                return BuildResult::Error;
            }
        };

        run.transition(PipelineState::Executing);
        let results = match config.run(&root).await {
            Ok(results) => results,
            Err(e) => {
                error!("{}", e);
                run.log_line(format!("Failed to execute {} command: {}", e.stage, e.source));
                return BuildResult::Error;
            }
        };

        let build_failed = results.build.exit_code() != 0;
        let tests_failed = results.test.exit_code() != 0;

        let mut outputs = Vec::with_capacity(2);
        for ((stage, command), result) in config.stages().into_iter().zip(results.into_vec()) {
            info!("{} command `{}` exited with {}", stage, command, result.exit_code());
            let output = result.into_output();
            for line in &output {
                info!("{}", line);
            }
            outputs.push(output);
        }

        let result = if build_failed || tests_failed {
            if build_failed {
                run.log_line(BUILD_FAILED);
            }
            if tests_failed {
                run.log_line(TESTS_FAILED);
            }
            BuildResult::Failure
        } else {
            run.log_line(BUILD_FILE_FOUND);
            BuildResult::Success
        };

        for output in outputs {
            run.log.push_entry(output);
        }

        result
    }

    /// Reports and persists the terminal record
    ///
    /// A failed write is only logged: the outcome is already decided.
    async fn finish(&self, mut run: Run<'_>, result: BuildResult) -> BuildRecord {
        let request = run.request;
        run.transition(PipelineState::from(result));

        let record = BuildRecord {
            job_id: request.job_id.clone(),
            result,
            commit_sha: request.commit_sha.clone(),
            repo_slug: request.repo_slug(),
            report_url: job_details_url(&self.settings.details_url, &request.job_id),
            log: run.log,
            timestamp: Some(completion_timestamp()),
        };

        self.reporter
            .report(
                &request.owner,
                &request.repo,
                &request.commit_sha,
                result,
                &request.job_id,
            )
            .await;

        if let Err(e) = self.store.post(&record).await {
            error!(
                "Failed to persist {} build {}: {}",
                result, request.job_id, e
            );
        }

        info!("Finished build job with id {} ({})", request.job_id, result);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryBuildStore, StoreError};
    use crate::service::checkout::CheckoutError;
    use crate::service::config_file::BUILD_CONFIG_FILE_NAME;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CLONE_URL: &str = "https://github.com/octo/hello.git";

    /// Checkout that materialises a work tree holding an optional build config
    struct FakeCheckout {
        config: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeCheckout {
        fn with_config(config: &str) -> Self {
            Self {
                config: Some(config.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn without_config() -> Self {
            Self {
                config: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceCheckout for FakeCheckout {
        async fn checkout(
            &self,
            _clone_url: &str,
            _branch_ref: &str,
            target_dir: &Path,
        ) -> Result<PathBuf, CheckoutError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::fs::create_dir_all(target_dir).unwrap();
            if let Some(config) = &self.config {
                std::fs::write(target_dir.join(BUILD_CONFIG_FILE_NAME), config).unwrap();
            }
            Ok(target_dir.to_path_buf())
        }
    }

    struct FailingCheckout;

    #[async_trait]
    impl SourceCheckout for FailingCheckout {
        async fn checkout(
            &self,
            clone_url: &str,
            _branch_ref: &str,
            _target_dir: &Path,
        ) -> Result<PathBuf, CheckoutError> {
            Err(CheckoutError::Clone {
                url: clone_url.to_string(),
                message: "Remote branch main not found".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        reported: Mutex<Vec<(String, BuildResult)>>,
    }

    impl RecordingReporter {
        fn results(&self) -> Vec<BuildResult> {
            self.reported
                .lock()
                .unwrap()
                .iter()
                .map(|(_, result)| *result)
                .collect()
        }
    }

    #[async_trait]
    impl StatusReporter for RecordingReporter {
        async fn report(
            &self,
            _owner: &str,
            _repo: &str,
            commit_sha: &str,
            result: BuildResult,
            _job_id: &str,
        ) {
            self.reported
                .lock()
                .unwrap()
                .push((commit_sha.to_string(), result));
        }
    }

    /// Store that keeps every write and can refuse pending or terminal ones
    #[derive(Default)]
    struct RecordingStore {
        posted: Mutex<Vec<BuildRecord>>,
        fail_pending: bool,
        fail_terminal: bool,
    }

    #[async_trait]
    impl BuildStore for RecordingStore {
        async fn post(&self, record: &BuildRecord) -> Result<(), StoreError> {
            let pending = record.result == BuildResult::Pending;
            if (pending && self.fail_pending) || (!pending && self.fail_terminal) {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            self.posted.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn get(&self, job_id: &str) -> Result<Option<BuildRecord>, StoreError> {
            Ok(self
                .posted
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|r| r.job_id == job_id)
                .cloned())
        }

        async fn list(&self) -> Result<Vec<BuildRecord>, StoreError> {
            Ok(self.posted.lock().unwrap().clone())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.posted.lock().unwrap().clear();
            Ok(())
        }
    }

    fn request(job_id: &str) -> RunRequest {
        RunRequest {
            job_id: job_id.to_string(),
            clone_url: CLONE_URL.to_string(),
            branch_ref: "refs/heads/main".to_string(),
            owner: "octo".to_string(),
            repo: "hello".to_string(),
            commit_sha: "afda99d6".to_string(),
        }
    }

    fn build_job(
        workspace: &Path,
        checkout: Arc<dyn SourceCheckout>,
        store: Arc<dyn BuildStore>,
        reporter: Arc<dyn StatusReporter>,
    ) -> BuildJob {
        BuildJob::new(
            checkout,
            store,
            reporter,
            JobSettings {
                workspace_dir: workspace.to_path_buf(),
                details_url: "http://localhost:3000".to_string(),
            },
        )
    }

    async fn run_config(config: &str) -> (BuildRecord, Arc<RecordingReporter>, Arc<InMemoryBuildStore>) {
        let workspace = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryBuildStore::new());
        let reporter = Arc::new(RecordingReporter::default());
        let job = build_job(
            workspace.path(),
            Arc::new(FakeCheckout::with_config(config)),
            store.clone(),
            reporter.clone(),
        );

        let record = job.run(request("job-1")).await;
        (record, reporter, store)
    }

    #[tokio::test]
    async fn test_successful_build() {
        let (record, reporter, store) = run_config("Build\necho hello\nTest\necho world\n").await;

        assert_eq!(record.result, BuildResult::Success);
        assert_eq!(
            record.log.entries(),
            [
                vec!["Running build job with id job-1"],
                vec!["Cloning repository."],
                vec![BUILD_FILE_FOUND],
                vec!["hello"],
                vec!["world"],
            ]
        );
        assert_eq!(record.repo_slug, "octo/hello");
        assert_eq!(record.report_url, "http://localhost:3000/build/job-1");
        assert!(record.timestamp.is_some());

        assert_eq!(reporter.results(), [BuildResult::Pending, BuildResult::Success]);
        assert_eq!(store.get("job-1").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_failed_build_stage() {
        let (record, _, _) = run_config("Build\nfalse\nTest\necho world\n").await;

        assert_eq!(record.result, BuildResult::Failure);
        assert!(record.log.contains_line(BUILD_FAILED));
        assert!(!record.log.contains_line(TESTS_FAILED));
        assert!(!record.log.contains_line(BUILD_FILE_FOUND));
        // Build produced no output, Test still ran
        assert!(record.log.entries().contains(&Vec::<String>::new()));
        assert!(record.log.contains_line("world"));
    }

    #[tokio::test]
    async fn test_failed_test_stage() {
        let (record, reporter, _) = run_config("Build\necho hello\nTest\nfalse\n").await;

        assert_eq!(record.result, BuildResult::Failure);
        assert!(record.log.contains_line(TESTS_FAILED));
        assert!(!record.log.contains_line(BUILD_FAILED));
        assert_eq!(reporter.results(), [BuildResult::Pending, BuildResult::Failure]);
    }

    #[tokio::test]
    async fn test_both_stages_failed() {
        let (record, _, _) = run_config("Build\nfalse\nTest\nfalse\n").await;

        assert_eq!(record.result, BuildResult::Failure);
        let failures: Vec<_> = record
            .log
            .entries()
            .iter()
            .flatten()
            .filter(|l| *l == BUILD_FAILED || *l == TESTS_FAILED)
            .collect();
        assert_eq!(failures, [BUILD_FAILED, TESTS_FAILED]);
    }

    #[tokio::test]
    async fn test_missing_build_file() {
        let workspace = tempfile::tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let job = build_job(
            workspace.path(),
            Arc::new(FakeCheckout::without_config()),
            Arc::new(InMemoryBuildStore::new()),
            reporter.clone(),
        );

        let record = job.run(request("job-2")).await;

        assert_eq!(record.result, BuildResult::Error);
        assert!(record.log.contains_line(BUILD_FILE_MISSING));
        assert_eq!(record.log.len(), 3);
        assert_eq!(reporter.results(), [BuildResult::Pending, BuildResult::Error]);
    }

    #[tokio::test]
    async fn test_clone_failure() {
        let workspace = tempfile::tempdir().unwrap();
        let job = build_job(
            workspace.path(),
            Arc::new(FailingCheckout),
            Arc::new(InMemoryBuildStore::new()),
            Arc::new(RecordingReporter::default()),
        );

        let record = job.run(request("job-3")).await;

        assert_eq!(record.result, BuildResult::Error);
        assert!(record
            .log
            .contains_line(&format!("Failed to clone repository {}", CLONE_URL)));
        assert!(!record.log.contains_line(BUILD_FILE_MISSING));
    }

    #[tokio::test]
    async fn test_malformed_config_runs_nothing() {
        let workspace = tempfile::tempdir().unwrap();
        let job = build_job(
            workspace.path(),
            Arc::new(FakeCheckout::with_config("Test\ntouch test-ran\nBuild\ntouch build-ran\n")),
            Arc::new(InMemoryBuildStore::new()),
            Arc::new(RecordingReporter::default()),
        );

        let record = job.run(request("job-4")).await;

        assert_eq!(record.result, BuildResult::Error);
        assert!(record
            .log
            .entries()
            .iter()
            .flatten()
            .any(|l| l.starts_with("Malformed build file:")));
        let checkout = workspace.path().join("job-4");
        assert!(!checkout.join("test-ran").exists());
        assert!(!checkout.join("build-ran").exists());
    }

    #[tokio::test]
    async fn test_unstartable_command() {
        let (record, _, _) = run_config("Build\nquay-no-such-program\nTest\necho world\n").await;

        assert_eq!(record.result, BuildResult::Error);
        assert!(record
            .log
            .entries()
            .iter()
            .flatten()
            .any(|l| l.starts_with("Failed to execute Build command:")));
        assert!(!record.log.contains_line("world"));
    }

    #[tokio::test]
    async fn test_pending_persistence_failure_aborts() {
        let workspace = tempfile::tempdir().unwrap();
        let checkout = Arc::new(FakeCheckout::with_config("Build\ntrue\nTest\ntrue\n"));
        let store = Arc::new(RecordingStore {
            fail_pending: true,
            ..Default::default()
        });
        let reporter = Arc::new(RecordingReporter::default());
        let job = build_job(workspace.path(), checkout.clone(), store.clone(), reporter.clone());

        let record = job.run(request("job-5")).await;

        assert_eq!(record.result, BuildResult::Error);
        assert!(record.log.contains_line(INTERNAL_ISSUE));
        assert_eq!(checkout.calls.load(Ordering::SeqCst), 0);
        assert_eq!(reporter.results(), [BuildResult::Pending, BuildResult::Error]);
        assert_eq!(store.list().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_terminal_persistence_failure_keeps_result() {
        let workspace = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordingStore {
            fail_terminal: true,
            ..Default::default()
        });
        let job = build_job(
            workspace.path(),
            Arc::new(FakeCheckout::with_config("Build\ntrue\nTest\ntrue\n")),
            store.clone(),
            Arc::new(RecordingReporter::default()),
        );

        let record = job.run(request("job-6")).await;

        assert_eq!(record.result, BuildResult::Success);
        let stored = store.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].result, BuildResult::Pending);
    }

    #[tokio::test]
    async fn test_one_pending_and_one_terminal_write() {
        let workspace = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordingStore::default());
        let job = build_job(
            workspace.path(),
            Arc::new(FakeCheckout::with_config("Build\necho hello\nTest\nfalse\n")),
            store.clone(),
            Arc::new(RecordingReporter::default()),
        );

        let record = job.run(request("job-7")).await;

        let posted = store.list().await.unwrap();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].result, BuildResult::Pending);
        assert_eq!(posted[0].commit_sha, "afda99d6");
        assert!(posted[0].timestamp.is_none());
        assert!(posted[0].repo_slug.is_empty());
        assert_eq!(
            posted[0].log.entries(),
            [vec!["Running build job with id job-7"]]
        );
        assert_eq!(posted[1], record);
        assert_eq!(posted[1].job_id, posted[0].job_id);
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let workspace = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryBuildStore::new());
        let job = Arc::new(build_job(
            workspace.path(),
            Arc::new(FakeCheckout::with_config("Build\necho hello\nTest\necho world\n")),
            store.clone(),
            Arc::new(RecordingReporter::default()),
        ));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let job = job.clone();
                tokio::spawn(async move { job.run(request(&format!("job-c{}", i))).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().result, BuildResult::Success);
        }
        assert_eq!(store.list().await.unwrap().len(), 4);
    }
}

//! Build domain types

use serde::{Deserialize, Serialize};

use crate::domain::log::Log;

/// Format used for the completion timestamp of a build record
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of a pipeline run
///
/// `Pending` is written once when a run starts. The other three variants are
/// terminal and exactly one of them is written when the run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildResult {
    Pending,
    Success,
    Failure,
    Error,
}

impl BuildResult {
    /// Lowercase name, used as the commit status state and the stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildResult::Pending => "pending",
            BuildResult::Success => "success",
            BuildResult::Failure => "failure",
            BuildResult::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BuildResult::Pending)
    }
}

impl std::fmt::Display for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BuildResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BuildResult::Pending),
            "success" => Ok(BuildResult::Success),
            "failure" => Ok(BuildResult::Failure),
            "error" => Ok(BuildResult::Error),
            other => Err(format!("unknown build result '{}'", other)),
        }
    }
}

/// Persisted record of one pipeline run
///
/// Keyed by `job_id`. The pending record written at run start is overwritten
/// by the terminal record under the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    pub job_id: String,
    pub result: BuildResult,
    pub commit_sha: String,
    /// `owner/repo`, empty on the pending record
    pub repo_slug: String,
    /// Job detail URL handed to the status API, empty on the pending record
    pub report_url: String,
    pub log: Log,
    /// Local time of the terminal write, absent on the pending record
    pub timestamp: Option<String>,
}

impl BuildRecord {
    /// Creates the record written when a run starts
    pub fn pending(job_id: impl Into<String>, commit_sha: impl Into<String>, log: Log) -> Self {
        Self {
            job_id: job_id.into(),
            result: BuildResult::Pending,
            commit_sha: commit_sha.into(),
            repo_slug: String::new(),
            report_url: String::new(),
            log,
            timestamp: None,
        }
    }
}

/// Current local time formatted as `YYYY-MM-DD HH:MM:SS`
pub fn completion_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

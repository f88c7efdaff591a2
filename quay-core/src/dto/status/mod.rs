//! Commit status DTOs
//!
//! Payload sent to the remote commit status API.

use serde::{Deserialize, Serialize};

use crate::domain::build::BuildResult;

/// Body of a commit status update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Lowercase build result
    pub state: String,
    /// Job detail page for this build
    pub target_url: String,
    pub description: String,
    /// Label identifying this CI system
    pub context: String,
}

impl CommitStatus {
    pub fn new(
        result: BuildResult,
        target_url: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            state: result.as_str().to_string(),
            target_url: target_url.into(),
            description: status_description(result).to_string(),
            context: context.into(),
        }
    }
}

/// Job detail page a commit status links to
pub fn job_details_url(details_url: &str, job_id: &str) -> String {
    format!("{}/build/{}", details_url.trim_end_matches('/'), job_id)
}

/// Human readable description shown next to the commit status
pub fn status_description(result: BuildResult) -> &'static str {
    match result {
        BuildResult::Pending => "Pending",
        BuildResult::Success => "Success",
        BuildResult::Failure => "Failure",
        _ => "Error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_and_description() {
        let status = CommitStatus::new(
            BuildResult::Success,
            "http://localhost:3000/build/job-1",
            "quay-ci",
        );

        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({
                "state": "success",
                "target_url": "http://localhost:3000/build/job-1",
                "description": "Success",
                "context": "quay-ci"
            })
        );
    }

    #[test]
    fn test_job_details_url() {
        assert_eq!(
            job_details_url("http://localhost:3000/", "job-1"),
            "http://localhost:3000/build/job-1"
        );
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(status_description(BuildResult::Pending), "Pending");
        assert_eq!(status_description(BuildResult::Failure), "Failure");
        assert_eq!(status_description(BuildResult::Error), "Error");
    }
}

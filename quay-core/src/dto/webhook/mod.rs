//! Webhook DTOs
//!
//! Payloads of the push webhook that triggers a build.

use serde::{Deserialize, Serialize};

/// Subset of a GitHub push event needed to start a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    /// Full ref that was pushed, e.g. `refs/heads/main`
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Commit SHA the ref points to after the push
    pub after: String,
    /// Set when the push deleted the ref
    #[serde(default)]
    pub deleted: bool,
    pub repository: PushRepository,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRepository {
    pub name: String,
    pub clone_url: String,
    pub owner: RepositoryOwner,
}

/// Repository owner as sent by GitHub
///
/// Push events carry `name`, most other events carry `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl PushEvent {
    /// Account that owns the pushed repository
    pub fn owner(&self) -> Option<&str> {
        self.repository
            .owner
            .login
            .as_deref()
            .or(self.repository.owner.name.as_deref())
    }
}

/// Response returned when a webhook starts a build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAccepted {
    pub job_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUSH: &str = r#"{
        "ref": "refs/heads/main",
        "before": "0000000000000000000000000000000000000000",
        "after": "afda99d6c1462f549e27dd86c0a6918194c4a7f6",
        "repository": {
            "name": "hello-ci",
            "full_name": "octo/hello-ci",
            "clone_url": "https://github.com/octo/hello-ci.git",
            "owner": { "name": "octo", "email": "octo@example.com" }
        },
        "pusher": { "name": "octo" }
    }"#;

    #[test]
    fn test_parse_push_event() {
        let event: PushEvent = serde_json::from_str(PUSH).unwrap();
        assert_eq!(event.git_ref, "refs/heads/main");
        assert_eq!(event.after, "afda99d6c1462f549e27dd86c0a6918194c4a7f6");
        assert_eq!(event.repository.name, "hello-ci");
        assert_eq!(
            event.repository.clone_url,
            "https://github.com/octo/hello-ci.git"
        );
        assert_eq!(event.owner(), Some("octo"));
        assert!(!event.deleted);
    }

    #[test]
    fn test_owner_prefers_login() {
        let event: PushEvent = serde_json::from_value(serde_json::json!({
            "ref": "refs/heads/dev",
            "after": "abc",
            "deleted": true,
            "repository": {
                "name": "r",
                "clone_url": "https://example.com/r.git",
                "owner": { "login": "octocat", "name": "The Octocat" }
            }
        }))
        .unwrap();

        assert_eq!(event.owner(), Some("octocat"));
        assert!(event.deleted);
    }
}

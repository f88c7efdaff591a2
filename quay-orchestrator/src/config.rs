//! Server configuration
//!
//! Every setting has a default so the server starts with an empty
//! environment.

use quay_runner::service::status::DEFAULT_STATUS_CONTEXT;
use std::path::PathBuf;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// sqlx connection string of the build store
    pub database_url: String,

    /// Directory holding one checkout per job
    pub workspace_dir: PathBuf,

    /// File holding the status API token
    pub token_file: PathBuf,

    /// Base URL of the commit status API (e.g., "https://api.github.com")
    pub status_api_url: String,

    /// Base URL of the build detail pages linked from commit statuses
    pub details_url: String,

    /// Label of the commit status
    pub status_context: String,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Recognised environment variables, all optional:
    /// - QUAY_BIND_ADDR (default: 0.0.0.0:8080)
    /// - DATABASE_URL (default: sqlite:quay.db?mode=rwc)
    /// - QUAY_WORKSPACE_DIR (default: .)
    /// - QUAY_TOKEN_FILE (default: token)
    /// - QUAY_STATUS_API_URL (default: https://api.github.com)
    /// - QUAY_DETAILS_URL (default: http://localhost:3000)
    /// - QUAY_STATUS_CONTEXT (default: quay-ci)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("QUAY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            workspace_dir: lookup("QUAY_WORKSPACE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_dir),
            token_file: lookup("QUAY_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_file),
            status_api_url: lookup("QUAY_STATUS_API_URL").unwrap_or(defaults.status_api_url),
            details_url: lookup("QUAY_DETAILS_URL").unwrap_or(defaults.details_url),
            status_context: lookup("QUAY_STATUS_CONTEXT").unwrap_or(defaults.status_context),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        for (name, url) in [
            ("status_api_url", &self.status_api_url),
            ("details_url", &self.details_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.status_context.is_empty() {
            anyhow::bail!("status_context cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: "sqlite:quay.db?mode=rwc".to_string(),
            workspace_dir: PathBuf::from("."),
            token_file: PathBuf::from("token"),
            status_api_url: "https://api.github.com".to_string(),
            details_url: "http://localhost:3000".to_string(),
            status_context: DEFAULT_STATUS_CONTEXT.to_string(),
        }
    }
}

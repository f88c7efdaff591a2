//! Source checkout
//!
//! Clones the pushed branch into the job's working directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("failed to prepare workspace {}: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to clone {url}: {message}")]
    Clone { url: String, message: String },
}

/// Checks out a branch of a remote repository into a local directory
#[async_trait]
pub trait SourceCheckout: Send + Sync {
    /// Checks out `branch_ref` of `clone_url` into `target_dir`
    ///
    /// # Returns
    /// The root of the checked out work tree
    async fn checkout(
        &self,
        clone_url: &str,
        branch_ref: &str,
        target_dir: &Path,
    ) -> Result<PathBuf, CheckoutError>;
}

/// Strips the `refs/heads/` or `refs/tags/` prefix git clone does not accept
pub fn branch_name(branch_ref: &str) -> &str {
    branch_ref
        .strip_prefix("refs/heads/")
        .or_else(|| branch_ref.strip_prefix("refs/tags/"))
        .unwrap_or(branch_ref)
}

/// Checkout backed by the `git` command line tool
#[derive(Debug, Clone)]
pub struct GitCheckout {
    git: String,
}

impl GitCheckout {
    pub fn new() -> Self {
        Self::with_binary("git")
    }

    /// Uses a specific git executable
    pub fn with_binary(git: impl Into<String>) -> Self {
        Self { git: git.into() }
    }
}

impl Default for GitCheckout {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceCheckout for GitCheckout {
    async fn checkout(
        &self,
        clone_url: &str,
        branch_ref: &str,
        target_dir: &Path,
    ) -> Result<PathBuf, CheckoutError> {
        if let Some(parent) = target_dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CheckoutError::Workspace {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let branch = branch_name(branch_ref);
        info!(
            "Cloning {} (branch {}) into {}",
            clone_url,
            branch,
            target_dir.display()
        );

        let output = Command::new(&self.git)
            .arg("clone")
            .arg("--branch")
            .arg(branch)
            .arg("--single-branch")
            .arg("--")
            .arg(clone_url)
            .arg(target_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(CheckoutError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CheckoutError::Clone {
                url: clone_url.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        debug!("Clone of {} complete", clone_url);
        Ok(target_dir.to_path_buf())
    }
}

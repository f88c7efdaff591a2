//! Build config scanning
//!
//! The build config is a line-oriented file at the checkout root. A line
//! containing the word `Build` or `Test` marks a stage, and the line directly
//! after it is that stage's command:
//!
//! ```text
//! Build
//! cargo build
//! Test
//! cargo test
//! ```
//!
//! Exactly one Build stage followed by exactly one Test stage is accepted.

use quay_core::domain::command::CommandResult;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use crate::service::execution::{ExecError, execute, split_command};

/// Name of the build config file at the checkout root
pub const BUILD_CONFIG_FILE_NAME: &str = ".dd.yml";

static STAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(Build|Test)\b").expect("stage marker pattern is valid"));

/// One of the two fixed pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Build,
    Test,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Build => write!(f, "Build"),
            StageKind::Test => write!(f, "Test"),
        }
    }
}

/// A stage marker found while scanning, with the line that followed it
///
/// `command` is `None` when the marker was the last line of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub kind: StageKind,
    pub command: Option<String>,
}

/// A well-formed build config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub build: String,
    pub test: String,
}

/// Captured output of both stages
#[derive(Debug, Clone)]
pub struct StageResults {
    pub build: CommandResult,
    pub test: CommandResult,
}

impl StageResults {
    /// Results in stage order
    pub fn into_vec(self) -> Vec<CommandResult> {
        vec![self.build, self.test]
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("build config not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Malformed(String),
}

/// A stage command that could not be run
#[derive(Debug, Error)]
#[error("{stage} command failed to run: {source}")]
pub struct StageError {
    pub stage: StageKind,
    #[source]
    pub source: ExecError,
}

/// Returns the stage marked by `line`, if any
///
/// When a line names both stages the first one wins.
fn stage_marker(line: &str) -> Option<StageKind> {
    STAGE_MARKER.find(line).map(|m| match m.as_str() {
        "Build" => StageKind::Build,
        _ => StageKind::Test,
    })
}

/// Finds every stage marker in file order
///
/// The line after a marker is taken verbatim as its command and is not itself
/// checked for a marker.
pub fn scan_stages(text: &str) -> Vec<Stage> {
    let mut stages = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        if let Some(kind) = stage_marker(line) {
            stages.push(Stage {
                kind,
                command: lines.next().map(str::to_string),
            });
        }
    }

    stages
}

/// Parses config text into a Build command and a Test command
pub fn parse_build_config(text: &str) -> Result<BuildConfig, ConfigError> {
    let stages = scan_stages(text);

    match stages.as_slice() {
        [] => Err(ConfigError::Malformed(
            "no Build or Test stage found".to_string(),
        )),
        [build, test] if build.kind == StageKind::Build && test.kind == StageKind::Test => {
            Ok(BuildConfig {
                build: stage_command(build)?,
                test: stage_command(test)?,
            })
        }
        [first, second] => Err(ConfigError::Malformed(format!(
            "expected a Build stage followed by a Test stage, found {} then {}",
            first.kind, second.kind
        ))),
        [only] => Err(ConfigError::Malformed(format!(
            "expected a Build stage followed by a Test stage, found only {}",
            only.kind
        ))),
        more => Err(ConfigError::Malformed(format!(
            "expected exactly two stages, found {}",
            more.len()
        ))),
    }
}

fn stage_command(stage: &Stage) -> Result<String, ConfigError> {
    let command = stage.command.as_deref().ok_or_else(|| {
        ConfigError::Malformed(format!("{} stage has no command line", stage.kind))
    })?;

    if split_command(command)
        .first()
        .is_none_or(|program| program.is_empty())
    {
        return Err(ConfigError::Malformed(format!(
            "{} stage has an empty command",
            stage.kind
        )));
    }

    Ok(command.to_string())
}

/// Reads and parses the build config directly under `root`
pub async fn load_build_config(root: &Path) -> Result<BuildConfig, ConfigError> {
    let path = root.join(BUILD_CONFIG_FILE_NAME);

    // Undecodable bytes become U+FFFD, as command output does
    let text = match tokio::fs::read(&path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path));
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    debug!("Loaded build config from {}", path.display());
    parse_build_config(&text)
}

impl BuildConfig {
    /// Stage commands in execution order
    pub fn stages(&self) -> [(StageKind, &str); 2] {
        [
            (StageKind::Build, self.build.as_str()),
            (StageKind::Test, self.test.as_str()),
        ]
    }

    /// Runs the Build command, then the Test command, in `root`
    ///
    /// Test starts only after the Build process has exited. Both stages run
    /// regardless of the Build exit code.
    pub async fn run(&self, root: &Path) -> Result<StageResults, StageError> {
        let build = execute(&self.build, root)
            .await
            .map_err(|source| StageError {
                stage: StageKind::Build,
                source,
            })?;

        let test = execute(&self.test, root)
            .await
            .map_err(|source| StageError {
                stage: StageKind::Test,
                source,
            })?;

        Ok(StageResults { build, test })
    }
}

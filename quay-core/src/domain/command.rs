//! Command output domain types

use serde::{Deserialize, Serialize};

/// Captured output of one stage command
///
/// Holds the merged stdout/stderr lines in arrival order followed by exactly
/// one trailing element: the decimal exit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandResult(Vec<String>);

impl CommandResult {
    /// Builds a result from captured lines and the process exit code
    pub fn new(mut lines: Vec<String>, exit_code: i32) -> Self {
        lines.push(exit_code.to_string());
        Self(lines)
    }

    /// Exit code stored in the trailing element
    pub fn exit_code(&self) -> i32 {
        self.0
            .last()
            .and_then(|code| code.parse().ok())
            .unwrap_or(-1)
    }

    /// Captured lines without the exit code
    pub fn output(&self) -> &[String] {
        &self.0[..self.0.len().saturating_sub(1)]
    }

    /// Consumes the result, returning the captured lines without the exit code
    pub fn into_output(mut self) -> Vec<String> {
        self.0.pop();
        self.0
    }

    /// Full representation, exit code included
    pub fn lines(&self) -> &[String] {
        &self.0
    }
}

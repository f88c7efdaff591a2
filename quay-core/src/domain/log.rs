//! Run log domain types

use serde::{Deserialize, Serialize};

/// Ordered, append-only log of a pipeline run
///
/// Each entry is itself a sequence of lines: status messages are single-line
/// entries, captured command output is one entry per stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Log(Vec<Vec<String>>);

impl Log {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a single-line entry
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.0.push(vec![line.into()]);
    }

    /// Appends a multi-line entry
    pub fn push_entry(&mut self, entry: Vec<String>) {
        self.0.push(entry);
    }

    /// Returns true if any entry contains exactly this line
    pub fn contains_line(&self, line: &str) -> bool {
        self.0.iter().flatten().any(|l| l == line)
    }

    pub fn entries(&self) -> &[Vec<String>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Vec<String>>> for Log {
    fn from(entries: Vec<Vec<String>>) -> Self {
        Self(entries)
    }
}

//! Credential sources
//!
//! The status API token is supplied by a [`CredentialSource`] handed to the
//! reporter at construction time.

use std::path::PathBuf;
use tracing::debug;

/// Provides the bearer token for the commit status API
pub trait CredentialSource: Send + Sync {
    /// Returns the token, or `None` when no credential is available
    fn token(&self) -> Option<String>;
}

/// Reads the token from the first line of a file
///
/// The file is read on every call so a replaced token is picked up without a
/// restart.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for TokenFile {
    fn token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents
                .lines()
                .next()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
            Err(e) => {
                debug!("Authorization token not found at {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// Fixed token, or no token at all
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

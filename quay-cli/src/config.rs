//! Configuration module
//!
//! Handles CLI configuration shared by all commands.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Quay server
    pub server_url: String,
}

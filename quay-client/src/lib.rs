//! Quay HTTP Clients
//!
//! Typed HTTP clients used by Quay:
//! - [`StatusClient`] posts commit statuses to the remote status API
//! - [`QuayClient`] reads build records from a running Quay server
//!
//! # Example
//!
//! ```no_run
//! use quay_client::QuayClient;
//!
//! # async fn example() -> quay_client::Result<()> {
//! let client = QuayClient::new("http://localhost:8080");
//! for build in client.list_builds().await? {
//!     println!("{} {}", build.job_id, build.result);
//! }
//! # Ok(())
//! # }
//! ```

mod builds;
pub mod credential;
pub mod error;
mod status;

// Re-export commonly used types
pub use credential::{CredentialSource, StaticToken, TokenFile};
pub use error::{ClientError, Result};
pub use status::StatusClient;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Quay server API
#[derive(Debug, Clone)]
pub struct QuayClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl QuayClient {
    /// Create a new server client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Quay server (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new server client with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Check the status code and deserialize a JSON body
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(response.json().await?)
}

/// Check the status code of a response whose body is not needed
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = QuayClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = QuayClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}

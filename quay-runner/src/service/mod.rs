//! Service layer
//!
//! Services contain the building blocks of a pipeline run: source checkout,
//! build config scanning, command execution and status reporting.
//!
//! Collaborators the pipeline depends on are trait-based so they can be
//! replaced in tests.

pub mod checkout;
pub mod config_file;
pub mod execution;
pub mod status;

// Re-export traits
pub use checkout::SourceCheckout;
pub use status::StatusReporter;

// Re-export implementations
pub use checkout::GitCheckout;
pub use status::{GitHubStatusReporter, NoopReporter};

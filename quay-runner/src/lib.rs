//! Quay Runner
//!
//! Runs the build pipeline for a single pushed commit.
//!
//! Architecture:
//! - Execution: Run requests and pipeline states
//! - Pipeline: The build job, from pending record to terminal record
//! - Repositories: Persistence of build records behind a trait
//! - Services: Source checkout, build config, command execution, status reporting
//!
//! The runner has no transport of its own. The orchestrator drives it from
//! webhook deliveries and the CLI drives it for local runs.

pub mod execution;
pub mod pipeline;
pub mod repository;
pub mod service;

pub use execution::{PipelineState, RunRequest};
pub use pipeline::{BuildJob, JobSettings};

//! Repository Module
//!
//! Data access layer for the orchestrator.

pub mod builds;

pub use builds::SqliteBuildStore;

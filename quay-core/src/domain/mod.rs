//! Core domain types
//!
//! This module contains the core domain structures used across Quay crates.
//! These types are shared between the orchestrator (persistence, HTTP API)
//! and the runner (pipeline execution).

pub mod build;
pub mod command;
pub mod log;

//! Quay Core
//!
//! Core types and abstractions for the Quay CI runner.
//!
//! This crate contains:
//! - Domain types: Build records, build results, command output and run logs
//! - DTOs: Webhook payloads and commit status payloads exchanged with the outside world

pub mod domain;
pub mod dto;

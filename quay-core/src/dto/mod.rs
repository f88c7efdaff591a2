//! Data Transfer Objects
//!
//! This module contains the payloads Quay exchanges with external services:
//! inbound push webhooks and outbound commit status updates.

pub mod status;
pub mod webhook;

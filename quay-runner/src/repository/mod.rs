//! Repository layer
//!
//! Persistence of build records. The pipeline only sees the [`BuildStore`]
//! trait; the server plugs in a database-backed store and tests use the
//! in-memory one.

mod builds;

// Re-export traits
pub use builds::{BuildStore, StoreError};

// Re-export implementations
pub use builds::InMemoryBuildStore;

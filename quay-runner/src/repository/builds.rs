//! Build record repository

use async_trait::async_trait;
use quay_core::domain::build::BuildRecord;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid stored build record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("build store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt build record: {0}")]
    InvalidRecord(String),
}

/// Key-value store of build records, keyed by job ID
#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Inserts the record or replaces the one stored under the same job ID
    async fn post(&self, record: &BuildRecord) -> Result<(), StoreError>;

    /// Gets the record stored under `job_id`
    async fn get(&self, job_id: &str) -> Result<Option<BuildRecord>, StoreError>;

    /// Lists every stored record, ordered by job ID
    async fn list(&self) -> Result<Vec<BuildRecord>, StoreError>;

    /// Removes every stored record
    async fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory build store
#[derive(Debug, Default)]
pub struct InMemoryBuildStore {
    records: RwLock<BTreeMap<String, BuildRecord>>,
}

impl InMemoryBuildStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BuildStore for InMemoryBuildStore {
    async fn post(&self, record: &BuildRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.job_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<BuildRecord>, StoreError> {
        Ok(self.records.read().await.get(job_id).cloned())
    }

    async fn list(&self) -> Result<Vec<BuildRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.records.write().await.clear();
        Ok(())
    }
}

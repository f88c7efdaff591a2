//! Build record endpoints

use crate::error::Result;
use crate::{QuayClient, handle_response};
use quay_core::domain::build::BuildRecord;

impl QuayClient {
    /// List all build records
    pub async fn list_builds(&self) -> Result<Vec<BuildRecord>> {
        let url = format!("{}/builds", self.base_url);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }

    /// Get a build record by job ID
    ///
    /// # Arguments
    /// * `job_id` - The job ID the record is stored under
    pub async fn get_build(&self, job_id: &str) -> Result<BuildRecord> {
        let url = format!("{}/build/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }
}

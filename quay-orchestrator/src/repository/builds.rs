//! Build Repository
//!
//! SQLite-backed [`BuildStore`].

use async_trait::async_trait;
use quay_core::domain::build::{BuildRecord, BuildResult};
use quay_runner::repository::{BuildStore, StoreError};
use sqlx::SqlitePool;

/// Build store persisting records in the `builds` table
#[derive(Debug, Clone)]
pub struct SqliteBuildStore {
    pool: SqlitePool,
}

impl SqliteBuildStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn database_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(Box::new(err))
}

#[async_trait]
impl BuildStore for SqliteBuildStore {
    async fn post(&self, record: &BuildRecord) -> Result<(), StoreError> {
        let log = serde_json::to_string(&record.log)?;

        sqlx::query(
            r#"
            INSERT INTO builds (job_id, result, commit_sha, repo_slug, report_url, log, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(job_id) DO UPDATE SET
                result = excluded.result,
                commit_sha = excluded.commit_sha,
                repo_slug = excluded.repo_slug,
                report_url = excluded.report_url,
                log = excluded.log,
                timestamp = excluded.timestamp
            "#,
        )
        .bind(&record.job_id)
        .bind(record.result.as_str())
        .bind(&record.commit_sha)
        .bind(&record.repo_slug)
        .bind(&record.report_url)
        .bind(log)
        .bind(&record.timestamp)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        tracing::debug!("Stored {} build {}", record.result, record.job_id);
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<BuildRecord>, StoreError> {
        let row = sqlx::query_as::<_, BuildRow>(
            r#"
            SELECT job_id, result, commit_sha, repo_slug, report_url, log, timestamp
            FROM builds
            WHERE job_id = ?
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(BuildRecord::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<BuildRecord>, StoreError> {
        let rows = sqlx::query_as::<_, BuildRow>(
            r#"
            SELECT job_id, result, commit_sha, repo_slug, report_url, log, timestamp
            FROM builds
            ORDER BY job_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(BuildRecord::try_from).collect()
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM builds")
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

// Internal row type for database queries
#[derive(sqlx::FromRow)]
struct BuildRow {
    job_id: String,
    result: String,
    commit_sha: String,
    repo_slug: String,
    report_url: String,
    log: String,
    timestamp: Option<String>,
}

impl TryFrom<BuildRow> for BuildRecord {
    type Error = StoreError;

    fn try_from(row: BuildRow) -> Result<Self, Self::Error> {
        let result = row
            .result
            .parse::<BuildResult>()
            .map_err(StoreError::InvalidRecord)?;

        Ok(BuildRecord {
            job_id: row.job_id,
            result,
            commit_sha: row.commit_sha,
            repo_slug: row.repo_slug,
            report_url: row.report_url,
            log: serde_json::from_str(&row.log)?,
            timestamp: row.timestamp,
        })
    }
}

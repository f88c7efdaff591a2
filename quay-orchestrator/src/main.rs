//! Quay Orchestrator
//!
//! HTTP server that turns push webhooks into pipeline runs and serves the
//! resulting build records.

use anyhow::{Context, Result};
use quay_client::{StatusClient, TokenFile};
use quay_runner::repository::BuildStore;
use quay_runner::service::{GitCheckout, GitHubStatusReporter};
use quay_runner::{BuildJob, JobSettings};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::config::Config;
use crate::repository::SqliteBuildStore;

pub mod api;
pub mod config;
pub mod db;
pub mod repository;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "quay_orchestrator=info,quay_runner=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quay Orchestrator...");

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;
    tracing::info!(
        "Loaded configuration: workspace_dir={}, status_api_url={}",
        config.workspace_dir.display(),
        config.status_api_url
    );

    tracing::info!("Connecting to database...");

    // Create database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let store: Arc<dyn BuildStore> = Arc::new(SqliteBuildStore::new(pool));
    let reporter = GitHubStatusReporter::new(
        StatusClient::new(config.status_api_url.clone()),
        Arc::new(TokenFile::new(config.token_file.clone())),
        config.details_url.clone(),
        config.status_context.clone(),
    );
    let job = BuildJob::new(
        Arc::new(GitCheckout::new()),
        store.clone(),
        Arc::new(reporter),
        JobSettings {
            workspace_dir: config.workspace_dir.clone(),
            details_url: config.details_url.clone(),
        },
    );

    // Build router with all API endpoints
    let app = api::create_router(AppState {
        store,
        job: Arc::new(job),
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

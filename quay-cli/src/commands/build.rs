//! Build command handlers
//!
//! Lists and shows build records stored on a Quay server.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use quay_client::QuayClient;

use crate::config::Config;
use crate::output::{print_build_details, print_build_summary};

/// Build subcommands
#[derive(Subcommand)]
pub enum BuildCommands {
    /// List all builds
    List,
    /// Get build details
    Get {
        /// Job ID of the build
        job_id: String,
    },
}

/// Handle build commands
pub async fn handle_build_command(command: BuildCommands, config: &Config) -> Result<()> {
    let client = QuayClient::new(&config.server_url);

    match command {
        BuildCommands::List => list_builds(&client).await,
        BuildCommands::Get { job_id } => get_build(&client, &job_id).await,
    }
}

/// List all builds
async fn list_builds(client: &QuayClient) -> Result<()> {
    let builds = client
        .list_builds()
        .await
        .context("Failed to list builds")?;

    if builds.is_empty() {
        println!("{}", "No builds found.".yellow());
    } else {
        println!("{}", format!("Found {} build(s):", builds.len()).bold());
        println!();
        for build in &builds {
            print_build_summary(build);
        }
    }

    Ok(())
}

/// Get and display a single build
async fn get_build(client: &QuayClient, job_id: &str) -> Result<()> {
    let build = client
        .get_build(job_id)
        .await
        .with_context(|| format!("Failed to get build {}", job_id))?;

    print_build_details(&build);

    Ok(())
}

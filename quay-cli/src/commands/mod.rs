//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod run;

pub use build::BuildCommands;
pub use run::RunArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one pipeline locally
    Run(RunArgs),
    /// Inspect builds stored on the server
    Build {
        #[command(subcommand)]
        command: BuildCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run(args) => run::handle_run_command(args).await,
        Commands::Build { command } => build::handle_build_command(command, config).await,
    }
}

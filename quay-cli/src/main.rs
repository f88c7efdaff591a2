//! Quay CLI
//!
//! Command-line interface for running pipelines locally and inspecting the
//! builds of a Quay server.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quay")]
#[command(about = "Quay CI CLI", long_about = None)]
struct Cli {
    /// Quay server URL
    #[arg(long, env = "QUAY_SERVER_URL", default_value = "http://localhost:8080")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quay_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::BuildCommands;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_get() {
        let cli = Cli::try_parse_from([
            "quay",
            "--server-url",
            "http://ci:8080",
            "build",
            "get",
            "job-1",
        ])
        .unwrap();

        assert_eq!(cli.server_url, "http://ci:8080");
        assert!(matches!(
            cli.command,
            Commands::Build {
                command: BuildCommands::Get { ref job_id }
            } if job_id == "job-1"
        ));
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "quay",
            "run",
            "--clone-url",
            "https://github.com/octo/hello.git",
            "--branch",
            "main",
            "--owner",
            "octo",
            "--repo",
            "hello",
            "--sha",
            "afda99d6",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.owner, "octo");
        assert!(args.job_id.is_none());
        assert!(args.token_file.is_none());
    }

    #[test]
    fn test_run_requires_sha() {
        let result = Cli::try_parse_from([
            "quay",
            "run",
            "--clone-url",
            "u",
            "--branch",
            "main",
            "--owner",
            "o",
            "--repo",
            "r",
        ]);
        assert!(result.is_err());
    }
}

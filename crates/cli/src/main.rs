//! # Radiator CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - configuration loading, validation and generation
//! - the dashboard main loop and channel lifecycle
//! - interrupt handling through the application run-state

mod app_state;
mod cli;
mod commands;
mod dashboard;
mod error;
mod screen;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_generate, run_info, run_radiator, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Radiator starting");

    let result = match &cli.command {
        Commands::Run(args) => run_radiator(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Generate(args) => run_generate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
///
/// Logs go to stderr (stdout carries the dashboard) or to `--log-file`.
fn init_logging(cli: &Cli) -> Result<()> {
    let (default_log_level, respect_env) = if cli.quiet {
        ("warn", false)
    } else {
        let level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        (level, true)
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: default_log_level.to_string(),
        respect_env,
        log_file: cli.log_file.clone(),
    })
}

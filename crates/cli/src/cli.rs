//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Radiator - wall-mounted status dashboard for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "radiator",
    author,
    version,
    about = "Terminal status radiator",
    long_about = "Polls shell commands and CI servers on independent schedules and renders \n\
                  their latest output into fixed screen regions at a steady frame rate.\n\n\
                  A slow or hung source only ever shows 'no signal' on its own panel."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RADIATOR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all log output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "RADIATOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, env = "RADIATOR_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the radiator
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Print the factory settings as a configuration file
    Generate(GenerateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); factory settings when omitted
    #[arg(short, long, env = "RADIATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override screen width in columns
    #[arg(long, env = "RADIATOR_WIDTH")]
    pub width: Option<u16>,

    /// Override screen height in rows
    #[arg(long, env = "RADIATOR_HEIGHT")]
    pub height: Option<u16>,

    /// Override frames per second of the main loop
    #[arg(long, env = "RADIATOR_FRAME_RATE")]
    pub frame_rate: Option<f64>,

    /// Override screen layout, header+left+right+footer (e.g. 1+2+2+0)
    #[arg(long, env = "RADIATOR_LAYOUT")]
    pub layout: Option<String>,

    /// Stop after this many seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "RADIATOR_DURATION")]
    pub duration: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RADIATOR_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "radiator.toml", env = "RADIATOR_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "radiator.toml", env = "RADIATOR_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed channel information
    #[arg(long)]
    pub channels: bool,
}

/// Arguments for the `generate` command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Emit JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["radiator", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert!(args.config.is_none());
                assert_eq!(args.duration, 0);
                assert_eq!(args.metrics_port, 0);
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "radiator", "-vv", "run", "--layout", "1+2+2+0", "--width", "120", "--frame-rate",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.layout.as_deref(), Some("1+2+2+0"));
                assert_eq!(args.width, Some(120));
                assert_eq!(args.frame_rate, Some(4.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["radiator", "-q", "-v", "generate"]).is_err());
    }

    #[test]
    fn test_generate_json_flag() {
        let cli = Cli::try_parse_from(["radiator", "generate", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Generate(GenerateArgs { json: true })));
    }
}

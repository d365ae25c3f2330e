//! `run` command implementation.

use std::io::BufWriter;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{RadiatorBlueprint, ScreenLayout};
use tracing::info;

use crate::app_state::AppState;
use crate::cli::RunArgs;
use crate::dashboard::{Dashboard, DashboardConfig};
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_radiator(args: &RunArgs) -> Result<()> {
    // Created first so an interrupt during startup exits instead of killing mid-spawn
    let state = Arc::new(AppState::new());
    state
        .install_signal_handler()
        .context("Failed to install signal handler")?;

    let mut blueprint = load_blueprint(args)?;
    apply_overrides(&mut blueprint, args)?;
    ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after command-line overrides")?;

    info!(
        layout = %blueprint.display.layout,
        width = blueprint.display.width,
        height = blueprint.display.height,
        frame_rate = blueprint.display.frame_rate,
        channels = blueprint.channels.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let dashboard = Dashboard::new(
        DashboardConfig {
            blueprint,
            duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        },
        state,
    );

    let mut out = BufWriter::new(std::io::stdout());
    let stats = dashboard
        .run(&mut out)
        .await
        .context("Dashboard execution failed")?;
    drop(out);

    info!(
        frames = stats.frames_rendered,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Radiator finished"
    );
    stats.print_summary();
    Ok(())
}

fn load_blueprint(args: &RunArgs) -> Result<RadiatorBlueprint> {
    match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            info!("No configuration file given, using factory settings");
            ConfigLoader::factory().context("Factory settings are invalid")
        }
    }
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(blueprint: &mut RadiatorBlueprint, args: &RunArgs) -> Result<(), CliError> {
    let display = &mut blueprint.display;

    if let Some(width) = args.width {
        info!(width, "Overriding screen width from CLI");
        display.width = width;
    }
    if let Some(height) = args.height {
        info!(height, "Overriding screen height from CLI");
        display.height = height;
    }
    if let Some(frame_rate) = args.frame_rate {
        if !(frame_rate > 0.0 && frame_rate.is_finite()) {
            return Err(CliError::invalid_override(
                "frame-rate",
                format!("must be > 0, got {frame_rate}"),
            ));
        }
        info!(frame_rate, "Overriding frame rate from CLI");
        display.frame_rate = frame_rate;
    }
    if let Some(layout) = &args.layout {
        let layout: ScreenLayout = layout
            .parse()
            .map_err(|e: contracts::ContractError| {
                CliError::invalid_override("layout", e.to_string())
            })?;
        info!(%layout, "Overriding screen layout from CLI");
        display.layout = layout;
    }
    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &RadiatorBlueprint) {
    let display = &blueprint.display;
    println!("\n=== Configuration Summary ===\n");
    println!("Display:");
    println!("  Title: {}", display.title);
    println!("  Size: {}x{}", display.width, display.height);
    println!(
        "  Layout: {} ({} panels)",
        display.layout,
        display.layout.total_rows()
    );
    println!("  Frame rate: {} fps", display.frame_rate);

    println!("\nChannels ({}):", blueprint.channels.len());
    for channel in &blueprint.channels {
        println!(
            "  - {} ({}) -> surface {}, every {:.1}s",
            channel.name,
            channel.provider.kind(),
            channel.surface,
            channel.update_period().as_secs_f64()
        );
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            width: None,
            height: None,
            frame_rate: None,
            layout: None,
            duration: 0,
            metrics_port: 0,
            dry_run: true,
        }
    }

    #[test]
    fn test_factory_settings_without_config() {
        let blueprint = load_blueprint(&args()).unwrap();
        assert_eq!(blueprint.channels.len(), 4);
    }

    #[test]
    fn test_missing_config_file() {
        let mut args = args();
        args.config = Some("/nonexistent/radiator.toml".into());
        let err = load_blueprint(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_loads_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[display]
layout = "1+0+0+0"

[[channels]]
name = "uptime"
surface = 0
provider = {{ kind = "command", program = "uptime" }}
"#
        )
        .unwrap();

        let mut args = args();
        args.config = Some(file.path().to_path_buf());
        let blueprint = load_blueprint(&args).unwrap();
        assert_eq!(blueprint.channels[0].name, "uptime");
    }

    #[test]
    fn test_overrides_applied() {
        let mut blueprint = RadiatorBlueprint::factory();
        let mut args = args();
        args.width = Some(100);
        args.frame_rate = Some(2.5);
        args.layout = Some("1+2+2+1".into());

        apply_overrides(&mut blueprint, &args).unwrap();
        assert_eq!(blueprint.display.width, 100);
        assert_eq!(blueprint.display.frame_rate, 2.5);
        assert_eq!(blueprint.display.layout.total_rows(), 6);
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let mut blueprint = RadiatorBlueprint::factory();

        let mut bad_layout = args();
        bad_layout.layout = Some("2+2".into());
        assert!(matches!(
            apply_overrides(&mut blueprint, &bad_layout),
            Err(CliError::InvalidOverride { flag: "layout", .. })
        ));

        let mut bad_rate = args();
        bad_rate.frame_rate = Some(0.0);
        assert!(matches!(
            apply_overrides(&mut blueprint, &bad_rate),
            Err(CliError::InvalidOverride {
                flag: "frame-rate",
                ..
            })
        ));
    }

    #[test]
    fn test_layout_override_can_orphan_surfaces() {
        let mut blueprint = RadiatorBlueprint::factory();
        let mut args = args();
        args.layout = Some("1+0+0+0".into());
        apply_overrides(&mut blueprint, &args).unwrap();
        assert!(ConfigLoader::validate(&blueprint).is_err());
    }
}

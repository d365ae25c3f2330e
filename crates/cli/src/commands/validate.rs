//! `validate` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::RadiatorBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    layout: String,
    panel_count: usize,
    channel_count: usize,
    frame_rate: f64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    layout: blueprint.display.layout.to_string(),
                    panel_count: blueprint.display.layout.total_rows(),
                    channel_count: blueprint.channels.len(),
                    frame_rate: blueprint.display.frame_rate,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RadiatorBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.channels.is_empty() {
        warnings.push("No channels configured - every panel stays blank".to_string());
    }

    let mut by_surface: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for channel in &blueprint.channels {
        by_surface
            .entry(channel.surface)
            .or_default()
            .push(channel.name.as_str());
    }

    for (surface, names) in &by_surface {
        if names.len() > 1 {
            warnings.push(format!(
                "Surface {} is shared by channels {} - they overwrite each other",
                surface,
                names.join(", ")
            ));
        }
    }

    let unassigned: Vec<String> = (0..blueprint.display.layout.total_rows())
        .filter(|surface| !by_surface.contains_key(surface))
        .map(|surface| surface.to_string())
        .collect();
    if !unassigned.is_empty() && !blueprint.channels.is_empty() {
        warnings.push(format!(
            "Surfaces without a channel: {}",
            unassigned.join(", ")
        ));
    }

    for channel in &blueprint.channels {
        if let Some(timeout) = channel.signal_timeout() {
            if timeout < channel.update_period() {
                warnings.push(format!(
                    "Channel '{}' signal timeout is shorter than its update period - it will flicker to no signal",
                    channel.name
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✅ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\nSummary:");
            println!("  Version: {}", summary.version);
            println!(
                "  Layout: {} ({} panels)",
                summary.layout, summary.panel_count
            );
            println!("  Channels: {}", summary.channel_count);
            println!("  Frame rate: {} fps", summary.frame_rate);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠️  Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("❌ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\nError: {}", error);
        }
    }
}

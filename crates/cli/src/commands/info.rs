//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{ChannelConfig, ProviderConfig, RadiatorBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::screen::Screen;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    display: DisplayInfo,
    channels: Vec<ChannelInfo>,
}

#[derive(Serialize)]
struct DisplayInfo {
    title: String,
    width: u16,
    height: u16,
    margin: u16,
    frame_rate: f64,
    layout: String,
    panels: Vec<PanelInfo>,
}

#[derive(Serialize)]
struct PanelInfo {
    surface: usize,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

#[derive(Serialize)]
struct ChannelInfo {
    name: String,
    provider: String,
    surface: usize,
    update_period_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ChannelDetails>,
}

#[derive(Serialize)]
struct ChannelDetails {
    drain_period_secs: f64,
    task_queue_capacity: usize,
    result_queue_capacity: usize,
    stop_grace_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal_timeout_secs: Option<f64>,
    source: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args.channels);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &RadiatorBlueprint, detailed: bool) -> ConfigInfo {
    let display = &blueprint.display;
    let panels = Screen::new(display)
        .panels()
        .iter()
        .map(|panel| {
            let region = panel.region();
            PanelInfo {
                surface: panel.surface(),
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
            }
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        display: DisplayInfo {
            title: display.title.clone(),
            width: display.width,
            height: display.height,
            margin: display.margin,
            frame_rate: display.frame_rate,
            layout: display.layout.to_string(),
            panels,
        },
        channels: blueprint
            .channels
            .iter()
            .map(|channel| ChannelInfo {
                name: channel.name.clone(),
                provider: channel.provider.kind().to_string(),
                surface: channel.surface,
                update_period_secs: channel.update_period().as_secs_f64(),
                details: detailed.then(|| channel_details(channel)),
            })
            .collect(),
    }
}

fn channel_details(channel: &ChannelConfig) -> ChannelDetails {
    ChannelDetails {
        drain_period_secs: channel.drain_period().as_secs_f64(),
        task_queue_capacity: channel.task_queue_capacity,
        result_queue_capacity: channel.result_queue_capacity,
        stop_grace_secs: channel.stop_grace().as_secs_f64(),
        signal_timeout_secs: channel.signal_timeout().map(|d| d.as_secs_f64()),
        source: describe_provider(&channel.provider),
    }
}

/// One-line description of what a provider runs
fn describe_provider(provider: &ProviderConfig) -> String {
    let command = |spec: &contracts::CommandSpec| {
        std::iter::once(spec.program.as_str())
            .chain(spec.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    };

    match provider {
        ProviderConfig::Command(spec) => command(spec),
        ProviderConfig::Pipe { first, second } => {
            format!("{} | {}", command(first), command(second))
        }
        ProviderConfig::Top => "top -H -b -n1 -p <parent pid>".to_string(),
        ProviderConfig::W => "w -s".to_string(),
        ProviderConfig::Finger { login_name } => match login_name {
            Some(login) => format!("finger {login}"),
            None => "finger $USER".to_string(),
        },
        ProviderConfig::TheCow => "fortune -s | cowsay".to_string(),
        ProviderConfig::JenkinsJobs { url, job_names } => {
            format!("{} [{}]", url, job_names.join(", "))
        }
        ProviderConfig::GerritOpenChanges {
            url, project, team, ..
        } => format!("{url}: project:{project} status:open ownerin:{team}"),
        ProviderConfig::Clock { format } => match format {
            Some(format) => format!("clock '{}'", format.escape_default()),
            None => "clock".to_string(),
        },
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("\n=== Radiator Configuration ===\n");
    println!("Version: {}", info.version);

    let display = &info.display;
    println!("\n🖥  Display");
    println!("   ├─ Title: {}", display.title);
    println!("   ├─ Size: {}x{} (margin {})", display.width, display.height, display.margin);
    println!("   ├─ Frame rate: {} fps", display.frame_rate);
    println!("   └─ Layout: {} ({} panels)", display.layout, display.panels.len());
    for panel in &display.panels {
        println!(
            "        surface {}: {}x{} at ({}, {})",
            panel.surface, panel.width, panel.height, panel.x, panel.y
        );
    }

    println!("\n📡 Channels ({})", info.channels.len());
    for channel in &info.channels {
        println!(
            "   ├─ {} ({}) -> surface {}, every {:.1}s",
            channel.name, channel.provider, channel.surface, channel.update_period_secs
        );
        if let Some(details) = &channel.details {
            println!("   │    source: {}", details.source);
            println!(
                "   │    drain every {:.3}s, queues {}/{}, stop grace {:.1}s",
                details.drain_period_secs,
                details.task_queue_capacity,
                details.result_queue_capacity,
                details.stop_grace_secs
            );
            if let Some(timeout) = details.signal_timeout_secs {
                println!("   │    no signal after {:.1}s without content", timeout);
            }
        }
    }

    println!();
}

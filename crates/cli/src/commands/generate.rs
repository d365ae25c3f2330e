//! `generate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use tracing::debug;

use crate::cli::GenerateArgs;

/// Execute the `generate` command
pub fn run_generate(args: &GenerateArgs) -> Result<()> {
    println!("{}", render_factory_settings(args.json)?);
    Ok(())
}

fn render_factory_settings(json: bool) -> Result<String> {
    let blueprint = ConfigLoader::factory().context("Factory settings are invalid")?;
    debug!(json, channels = blueprint.channels.len(), "Generating factory settings");

    if json {
        ConfigLoader::to_json(&blueprint).context("Failed to serialize factory settings")
    } else {
        ConfigLoader::to_toml(&blueprint).context("Failed to serialize factory settings")
    }
}

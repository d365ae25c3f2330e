//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `RadiatorBlueprint`, or the factory settings when no file is given
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("radiator.toml")).unwrap();
//! println!("Channels: {}", blueprint.channels.len());
//! ```

mod parser;
mod validator;

pub use contracts::RadiatorBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RadiatorBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RadiatorBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validated factory settings
    pub fn factory() -> Result<RadiatorBlueprint, ContractError> {
        let blueprint = RadiatorBlueprint::factory();
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-validate a blueprint, e.g. after command-line overrides
    pub fn validate(blueprint: &RadiatorBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize RadiatorBlueprint to TOML string
    pub fn to_toml(blueprint: &RadiatorBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RadiatorBlueprint to JSON string
    pub fn to_json(blueprint: &RadiatorBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RadiatorBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ProviderConfig;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[display]
title = "Ops"
layout = "1+1+1+0"

[[channels]]
name = "clock"
surface = 0
update_period_secs = 1.0
[channels.provider]
kind = "clock"

[[channels]]
name = "load"
surface = 1
update_period_secs = 10.0
[channels.provider]
kind = "command"
program = "uptime"

[[channels]]
name = "ci"
surface = 2
[channels.provider]
kind = "jenkins_jobs"
url = "https://ci.example.org/job/"
job_names = ["nightly", "release"]
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.display.title, "Ops");
        assert_eq!(bp.channels.len(), 3);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.display.layout, bp2.display.layout);
        assert_eq!(bp.channels.len(), bp2.channels.len());
        assert_eq!(bp.channels[2].provider, bp2.channels[2].provider);
    }

    #[test]
    fn test_gerrit_provider_without_credentials() {
        let content = r#"
[display]
layout = "0+1+0+0"

[[channels]]
name = "reviews"
surface = 0
provider = { kind = "gerrit_open_changes", url = "review.example.org", project = "radiator", team = "core" }
"#;
        let bp = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        assert_eq!(
            bp.channels[0].provider,
            ProviderConfig::GerritOpenChanges {
                url: "review.example.org".into(),
                project: "radiator".into(),
                team: "core".into(),
                user: None,
                password: None,
            }
        );

        // unset credentials stay out of generated files
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        assert!(!serialized.contains("password"));
    }

    #[test]
    fn test_factory_settings_serialize_and_reload() {
        let factory = ConfigLoader::factory().unwrap();
        let json = ConfigLoader::to_json(&factory).unwrap();
        let reloaded = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(reloaded.channels.len(), factory.channels.len());
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[display]
layout = "0+0+0+0"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("zero configured"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert!(bp.channel("load").is_some());
    }

    #[test]
    fn test_load_from_path_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}

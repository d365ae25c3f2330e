//! # Content Providers
//!
//! Built-in content sources and the startup-time registry that turns a
//! `ProviderConfig` into the `FetchFunction` a channel runs.
//!
//! # Example
//!
//! ```ignore
//! use contracts::ProviderConfig;
//!
//! let fetch = content_providers::create_fetch_function(&ProviderConfig::W)?;
//! let content = fetch();
//! ```

pub mod clock;
pub mod command;
pub mod error;
pub mod gerrit;
pub mod jenkins;
pub mod system;

pub use clock::ClockProvider;
pub use command::{execute_compound, execute_simple, CommandProvider, PipeProvider};
pub use error::ProviderError;
pub use gerrit::GerritOpenChangesProvider;
pub use jenkins::JenkinsJobsProvider;
pub use system::{FingerProvider, TheCowProvider, TopProvider, WProvider};

use contracts::{into_fetch_function, ChannelConfig, ContractError, FetchFunction, ProviderConfig};
use tracing::debug;

/// Build the fetch callable for a provider configuration
pub fn create_fetch_function(config: &ProviderConfig) -> Result<FetchFunction, ProviderError> {
    let fetch = match config {
        ProviderConfig::Command(spec) => into_fetch_function(CommandProvider::new(spec.clone())?),
        ProviderConfig::Pipe { first, second } => {
            into_fetch_function(PipeProvider::new(first.clone(), second.clone())?)
        }
        ProviderConfig::Top => into_fetch_function(TopProvider::new()),
        ProviderConfig::W => into_fetch_function(WProvider::new()),
        ProviderConfig::Finger { login_name } => {
            into_fetch_function(FingerProvider::new(login_name.clone())?)
        }
        ProviderConfig::TheCow => into_fetch_function(TheCowProvider::new()),
        ProviderConfig::JenkinsJobs { url, job_names } => {
            into_fetch_function(JenkinsJobsProvider::new(url.clone(), job_names.clone())?)
        }
        ProviderConfig::GerritOpenChanges {
            url,
            project,
            team,
            user,
            password,
        } => {
            let credentials = gerrit::Credentials::resolve(
                user.as_deref(),
                password.as_deref(),
                |key| std::env::var(key).ok(),
            )?;
            into_fetch_function(GerritOpenChangesProvider::new(url, project, team, credentials)?)
        }
        ProviderConfig::Clock { format } => {
            into_fetch_function(ClockProvider::new(format.clone())?)
        }
    };

    debug!(kind = config.kind(), "Content provider created");
    Ok(fetch)
}

/// Build the fetch callable for a channel, naming the channel on failure
pub fn fetch_function_for(channel: &ChannelConfig) -> Result<FetchFunction, ContractError> {
    create_fetch_function(&channel.provider)
        .map_err(|e| ContractError::provider_creation(&channel.name, e.to_string()))
}

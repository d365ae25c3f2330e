//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Command-line override rejected
    #[error("Invalid override --{flag}: {message}")]
    InvalidOverride { flag: &'static str, message: String },

    /// Channel refers to a surface the layout does not have
    #[error("Channel '{channel}' uses surface {surface}, but the screen has {available} panels")]
    MissingSurface {
        channel: String,
        surface: usize,
        available: usize,
    },

    /// Signal handler can only be installed once per process
    #[error("Signal handler already installed")]
    SignalHandlerInstalled,

    /// Terminal write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_override(flag: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            flag,
            message: message.into(),
        }
    }
}

//! Layered error definitions
//!
//! Categorized by source: config / provider / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Screen layout string is malformed
    #[error("invalid screen layout '{layout}': expected H+L+R+F with single digits")]
    InvalidScreenLayout { layout: String },

    // ===== Provider Errors =====
    /// Content provider could not be created from its configuration
    #[error("content provider for channel '{channel}' could not be created: {message}")]
    ProviderCreation { channel: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create provider creation error
    pub fn provider_creation(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderCreation {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

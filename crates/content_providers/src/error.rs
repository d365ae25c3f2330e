//! Content provider errors
//!
//! Only creation errors leave this crate. Fetch-time errors are turned into
//! empty content by each provider.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider configuration cannot produce a working provider
    #[error("cannot create {kind} provider: {message}")]
    Creation { kind: &'static str, message: String },

    /// Child process could not be spawned or awaited
    #[error("command '{program}' failed: {source}")]
    Command {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Command output is not valid UTF-8
    #[error("command '{program}' produced non UTF-8 output")]
    NonUtf8Output { program: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn creation(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Creation {
            kind,
            message: message.into(),
        }
    }

    pub fn command(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Command {
            program: program.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Http(e.to_string())
    }
}

//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Component was already started (components are single-use)
    #[error("{component} for channel '{name}' already started")]
    AlreadyStarted {
        component: &'static str,
        name: String,
    },

    /// Component is not running
    #[error("{component} for channel '{name}' is not running")]
    NotRunning {
        component: &'static str,
        name: String,
    },

    /// Worker thread could not be spawned
    #[error("failed to spawn worker for channel '{name}': {source}")]
    WorkerSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Queue handle was already handed out
    #[error("{queue} queue for channel '{name}' already taken")]
    QueueTaken { queue: &'static str, name: String },
}

impl DispatcherError {
    pub fn already_started(component: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyStarted {
            component,
            name: name.into(),
        }
    }

    pub fn not_running(component: &'static str, name: impl Into<String>) -> Self {
        Self::NotRunning {
            component,
            name: name.into(),
        }
    }

    pub fn queue_taken(queue: &'static str, name: impl Into<String>) -> Self {
        Self::QueueTaken {
            queue,
            name: name.into(),
        }
    }
}

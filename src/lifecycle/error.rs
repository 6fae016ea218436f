//! Lifecycle-specific error types

use super::LifecycleEvent;
use thiserror::Error;

/// Errors that can occur during lifecycle operations
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A lifecycle handler returned an error
    #[error("{event} handler failed for {component}: {source:#}")]
    HookFailed {
        /// Name of the component that owns the handler
        component: String,
        /// The event being dispatched
        event: LifecycleEvent,
        /// Error returned by the handler
        #[source]
        source: anyhow::Error,
    },

    /// Operation timed out
    #[error("Timeout during {phase}: {message}")]
    Timeout {
        /// The lifecycle phase where timeout occurred
        phase: String,
        /// Additional error message
        message: String,
    },

    /// The network listener could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error
    #[error("Server error: {0}")]
    Server(String),
}

impl LifecycleError {
    /// Create a handler failure error
    pub fn hook_failed(
        component: impl Into<String>,
        event: LifecycleEvent,
        source: anyhow::Error,
    ) -> Self {
        Self::HookFailed {
            component: component.into(),
            event,
            source,
        }
    }

    /// Create a timeout error
    pub fn timeout(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            phase: phase.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

use crate::lifecycle::LifecycleError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TesseraError>;

#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("Illegal value: {message}")]
    IllegalValue { message: String },

    #[error("A component named '{name}' is already registered")]
    DuplicateRegistration { name: String },

    #[error("Cyclic dependency detected: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Unresolved dependency '{dependency}' required by '{component}'")]
    UnresolvedDependency {
        component: String,
        dependency: String,
    },

    #[error("Failed to downcast '{name}' to {type_name}")]
    DowncastFailed { name: String, type_name: String },

    #[error("Failed to construct '{component}': {source}")]
    ConstructionFailed {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid application state: expected {expected}, found {actual}")]
    InvalidState { expected: String, actual: String },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TesseraError {
    pub fn illegal_value(message: impl Into<String>) -> Self {
        Self::IllegalValue {
            message: message.into(),
        }
    }
}

//! Application error kinds
//!
//! Request handlers fail with an [`ApplicationError`]; each kind maps to an
//! HTTP status (see [`http`]). Components can inject `$E` to get the
//! [`ErrorKinds`] factory.

use axum::http::StatusCode;
use thiserror::Error;

pub mod http;

#[derive(Debug, Clone, PartialEq, Eq, Error, strum_macros::IntoStaticStr)]
pub enum ApplicationError {
    #[error("{0}")]
    General(String),

    #[error("Access denied: {0}")]
    Access(String),

    #[error("Authentication required: {0}")]
    Authentication(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Illegal value: {0}")]
    IllegalValue(String),

    #[error("Not allowed: {0}")]
    NotAllowed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Range out of bounds: {0}")]
    RangeOutOfBounds(String),
}

impl ApplicationError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApplicationError::General(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApplicationError::Access(_) => StatusCode::FORBIDDEN,
            ApplicationError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApplicationError::DuplicateEntry(_) => StatusCode::CONFLICT,
            ApplicationError::IllegalValue(_) => StatusCode::BAD_REQUEST,
            ApplicationError::NotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApplicationError::NotFound(_) => StatusCode::NOT_FOUND,
            ApplicationError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApplicationError::RangeOutOfBounds(_) => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }

    /// Variant name, e.g. `NotFound`
    pub fn code(&self) -> &'static str {
        self.into()
    }
}

/// The `$E` service: constructors for every [`ApplicationError`] kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorKinds;

impl ErrorKinds {
    pub fn general(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::General(message.into())
    }

    pub fn access(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::Access(message.into())
    }

    pub fn authentication(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::Authentication(message.into())
    }

    pub fn duplicate_entry(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::DuplicateEntry(message.into())
    }

    pub fn illegal_value(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::IllegalValue(message.into())
    }

    pub fn not_allowed(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::NotAllowed(message.into())
    }

    pub fn not_found(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::NotFound(message.into())
    }

    pub fn not_implemented(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::NotImplemented(message.into())
    }

    pub fn range_out_of_bounds(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::RangeOutOfBounds(message.into())
    }
}

//! Error types for Rollcall.

use crate::contact::{ContactField, DuplicateField};

/// Errors that can occur while registering or counting contacts.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Submitted input failed a shape rule.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: ContactField,
        /// Message reported to the caller
        message: String,
    },

    /// A record with the same normalized email or phone already exists.
    #[error("Duplicate {field}: {}", field.message())]
    Duplicate {
        /// Field that collided with an existing record
        field: DuplicateField,
    },

    /// The spreadsheet backend was unreachable or returned something unusable.
    #[error("Backend error: {message}")]
    Backend {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

/// Convenience `Result` type alias for Rollcall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the caller caused this error (bad input or a duplicate).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::Duplicate { .. })
    }

    /// Creates a validation error for a field.
    pub fn validation_field<M: Into<String>>(field: ContactField, message: M) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// Creates a duplicate error.
    pub fn duplicate(field: DuplicateField) -> Self {
        Error::Duplicate { field }
    }

    /// Creates a new backend error with a message.
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Error::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new backend error with a message and source error.
    pub fn backend_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

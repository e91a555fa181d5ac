//! Error types for the insights engine.
//!
//! Analytical functions never return errors for degenerate input - they
//! produce well-formed zero-valued results instead. The variants here cover
//! the remaining failure modes: collaborator I/O, serialization, and
//! configuration mistakes.

use thiserror::Error;

/// Main error type for Metricsight operations.
#[derive(Debug, Error)]
pub enum MetricsightError {
    /// Fetching raw data from the data-access collaborator failed
    #[error("Data access failed: {context}")]
    DataAccess {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Reading from or writing to the report store failed
    #[error("Report store operation failed: {context}")]
    Storage {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with MetricsightError
pub type Result<T> = std::result::Result<T, MetricsightError>;

impl MetricsightError {
    /// Creates a data-access error with context
    pub fn data_access<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DataAccess {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a report-store error with context
    pub fn storage<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}

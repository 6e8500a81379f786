//! Store error types
//!
//! `StoreError` is the one error type every `ProductRepository` returns,
//! whichever backend serves it. Adapters translate their native failures into
//! it and otherwise pass them through unchanged; nothing here retries.

use std::fmt;
use thiserror::Error;

use crate::pattern::PatternError;

/// Result alias used by repository operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row addressed by an update does not exist
    #[error("Not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A unique constraint rejected the write
    #[error("Unique constraint '{constraint}' violated: {message}")]
    UniqueViolation { constraint: String, message: String },

    /// A single-result lookup matched more than one row
    #[error("Expected at most one result but found {found}")]
    NonUniqueResult { found: usize },

    /// A text value does not fit its column
    #[error("Value too long: {0}")]
    ValueTooLong(String),

    /// Any other integrity constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The query text or a pattern argument could not be evaluated
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// The store could not be reached
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The statement failed for another reason
    #[error("Query failed: {0}")]
    Query(String),

    /// The store is misconfigured
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn unique_violation(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        StoreError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if a unique constraint rejected the write
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }

    /// Returns true if the store was unreachable
    pub fn is_connection_error(&self) -> bool {
        matches!(self, StoreError::Connection { .. })
    }

    /// Name of the violated constraint, when known
    pub fn constraint(&self) -> Option<&str> {
        match self {
            StoreError::UniqueViolation { constraint, .. } => Some(constraint),
            _ => None,
        }
    }
}

impl From<PatternError> for StoreError {
    fn from(error: PatternError) -> Self {
        StoreError::MalformedQuery(error.to_string())
    }
}

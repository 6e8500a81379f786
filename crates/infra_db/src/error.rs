//! Database error types
//!
//! This module defines the error types that can occur during database operations
//! and their translation into the store-level `StoreError` of the repository port.

use catalog_core::StoreError;
use thiserror::Error;

/// Errors that can occur during database operations
///
/// This enum captures all possible database-related errors, including
/// connection issues, query failures, and constraint violations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry violates '{constraint}': {message}")]
    DuplicateEntry { constraint: String, message: String },

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check or not-null constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A text value exceeds the length of its column
    #[error("Value too long: {0}")]
    ValueTooLong(String),

    /// Statement text or a pattern argument was rejected by the server
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// A single-row lookup matched several rows
    #[error("Expected at most one row, found {0}")]
    NonUniqueResult(usize),

    /// Transaction error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Schema bootstrap error
    #[error("Schema setup failed: {0}")]
    SchemaFailed(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Product", "PRD-12");
    /// assert!(error.to_string().contains("Product"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry { .. }
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
                | DatabaseError::ValueTooLong(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
///
/// The mapping follows the PostgreSQL SQLSTATE of database errors.
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Configuration(e) => DatabaseError::Configuration(e.to_string()),
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry {
                        constraint: db_err.constraint().unwrap_or_default().to_string(),
                        message,
                    },
                    Some("23503") => DatabaseError::ForeignKeyViolation(message),
                    Some("23502") | Some("23514") => DatabaseError::ConstraintViolation(message),
                    Some("22001") => DatabaseError::ValueTooLong(message),
                    Some("22025") | Some("42601") | Some("42P01") | Some("42703")
                    | Some("42883") => DatabaseError::MalformedQuery(message),
                    Some(code) if code.starts_with("08") => {
                        DatabaseError::ConnectionFailed(message)
                    }
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<config::ConfigError> for DatabaseError {
    fn from(error: config::ConfigError) -> Self {
        DatabaseError::Configuration(error.to_string())
    }
}

/// Translates database failures into the port's error type
impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::DuplicateEntry { constraint, message } => {
                StoreError::unique_violation(constraint, message)
            }
            DatabaseError::NonUniqueResult(found) => StoreError::NonUniqueResult { found },
            DatabaseError::ForeignKeyViolation(message)
            | DatabaseError::ConstraintViolation(message) => {
                StoreError::ConstraintViolation(message)
            }
            DatabaseError::ValueTooLong(message) => StoreError::ValueTooLong(message),
            DatabaseError::MalformedQuery(message) => StoreError::MalformedQuery(message),
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => {
                StoreError::Connection {
                    message: error.to_string(),
                    source: Some(Box::new(error)),
                }
            }
            DatabaseError::Configuration(message) => StoreError::Configuration(message),
            DatabaseError::NotFound(message)
            | DatabaseError::QueryFailed(message)
            | DatabaseError::TransactionFailed(message)
            | DatabaseError::SchemaFailed(message) => StoreError::Query(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_connection_error() {
        let error = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(error.is_connection_error());

        let store: StoreError = error.into();
        assert!(store.is_connection_error());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(DatabaseError::from(sqlx::Error::RowNotFound).is_not_found());
    }

    #[test]
    fn test_duplicate_entry_keeps_constraint_name() {
        let error = DatabaseError::DuplicateEntry {
            constraint: "sku_unique".to_string(),
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert!(error.is_constraint_violation());

        let store: StoreError = error.into();
        assert_eq!(store.constraint(), Some("sku_unique"));
    }

    #[test]
    fn test_value_too_long_is_a_rejected_write() {
        let error = DatabaseError::ValueTooLong(
            "value too long for type character varying(255)".to_string(),
        );
        assert!(error.is_constraint_violation());

        let store: StoreError = error.into();
        assert!(matches!(store, StoreError::ValueTooLong(_)));
        assert!(!store.is_unique_violation());
    }

    #[test]
    fn test_non_unique_result_is_preserved() {
        let store: StoreError = DatabaseError::NonUniqueResult(3).into();
        assert!(matches!(store, StoreError::NonUniqueResult { found: 3 }));
    }
}

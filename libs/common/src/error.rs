//! Custom error types for the common library
//!
//! Repositories return [`DatabaseError`], the object store returns
//! [`StorageError`], and the domain services fold both into
//! [`ServiceError`] alongside the domain failures callers act on.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// True when the unique constraint or index named `constraint` fired
    pub fn is_unique_violation_on(&self, constraint: &str) -> bool {
        match self {
            DatabaseError::Query(SqlxError::Database(db_err)) => {
                db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
            }
            _ => false,
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised by the object store client
#[derive(Error, Debug)]
pub enum StorageError {
    /// Presigning configuration or signing failed
    #[error("Failed to presign {operation} for {key}: {message}")]
    Presign {
        operation: &'static str,
        key: String,
        message: String,
    },

    /// A request against the object store failed
    #[error("Object store request failed for {key}: {message}")]
    Request { key: String, message: String },

    /// The object was not found in the bucket
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Reading a response body failed
    #[error("Failed to read object body for {key}: {message}")]
    Body { key: String, message: String },
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while loading process configuration
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors returned by the domain services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The entity does not exist, or was soft-deleted
    #[error("{0}")]
    NotFound(String),

    /// The request was well-formed but not acceptable
    #[error("{0}")]
    Validation(String),

    /// The caller may not perform this operation
    #[error("{0}")]
    Unauthorized(String),

    #[error("too many files: maximum {max} files per batch")]
    BatchTooLarge { max: usize },

    #[error("failed to generate unique code after {attempts} attempts")]
    CodeGenerationExhausted { attempts: usize },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Type alias for Result with ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_messages() {
        assert_eq!(
            ServiceError::BatchTooLarge { max: 50 }.to_string(),
            "too many files: maximum 50 files per batch"
        );
        assert_eq!(
            ServiceError::CodeGenerationExhausted { attempts: 10 }.to_string(),
            "failed to generate unique code after 10 attempts"
        );
        assert_eq!(
            ServiceError::NotFound("event not found".to_string()).to_string(),
            "event not found"
        );
    }

    #[test]
    fn test_non_query_errors_are_not_unique_violations() {
        let err = DatabaseError::Migration("boom".to_string());
        assert!(!err.is_unique_violation_on("events_code_live_key"));

        let err = DatabaseError::Query(SqlxError::RowNotFound);
        assert!(!err.is_unique_violation_on("events_code_live_key"));
    }
}

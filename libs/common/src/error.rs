//! Custom error types for the common library
//!
//! This module defines the error types shared by every service: database
//! failures and missing or malformed process configuration.

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

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Operator-correctable configuration failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is unset or empty
    #[error("{0} is not configured")]
    Missing(&'static str),

    /// A setting is present but cannot be interpreted
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

//! Error types for the user service

use common::ConfigError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Rule a field value broke during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Pattern,
    Email,
    MinLength(usize),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "required"),
            Rule::Pattern => write!(f, "pattern"),
            Rule::Email => write!(f, "email"),
            Rule::MinLength(min) => write!(f, "min length {}", min),
        }
    }
}

/// A field failed validation; reported to the caller, never corrected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} failed {rule} validation: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, rule: Rule, message: &'static str) -> Self {
        Self {
            field,
            rule,
            message,
        }
    }
}

/// Password hashing failure
#[derive(Error, Debug)]
pub enum PasswordError {
    /// The new plaintext does not meet the password rule
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Failed to hash password: {0}")]
    Hash(String),
}

/// Token issuance or verification failure
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signing secret or expiry is unset or malformed
    #[error("Token configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to get current time: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

/// User repository failure
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Username or email already taken
    #[error("A user with this {0} already exists")]
    Duplicate(&'static str),

    #[error("User {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

//! Custom error types for the common library
//!
//! This module defines the store-level error type shared by every repository
//! backend in the application.

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

    /// Error occurred while creating the collections at startup
    #[error("Database schema error: {0}")]
    Schema(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A stored document could not be decoded
    #[error("Document decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A uniqueness rule of the store rejected the write
    #[error("Duplicate key: {0}")]
    Duplicate(String),
}

impl DatabaseError {
    /// Classify a query error, separating unique-constraint violations
    /// from every other failure.
    pub fn from_query(err: SqlxError) -> Self {
        match &err {
            SqlxError::Database(db) if db.is_unique_violation() => {
                DatabaseError::Duplicate(db.message().to_string())
            }
            _ => DatabaseError::Query(err),
        }
    }

    /// Whether the error reports a uniqueness violation
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DatabaseError::Duplicate(_))
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

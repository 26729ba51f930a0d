//! Error types for the storage layer.

use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record was not found.
    #[error("record not found")]
    NotFound,

    /// No pooled connection became free before the acquire timeout.
    #[error("database connection pool exhausted")]
    PoolTimedOut,

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(String),

    /// A stored value could not be decoded into its domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::PoolTimedOut => Self::PoolTimedOut,
            other => Self::Database(other.to_string()),
        }
    }
}

//! Common error types for the valet booking service.
//!
//! These errors describe malformed input at the edges of the system and are
//! shared by the store, scheduling, and gateway crates.

use thiserror::Error;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,
}

/// Errors that can occur when parsing clock times and calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The input is not a `HH:MM` or `HH:MM:SS` time of day.
    #[error("invalid time of day: {0}")]
    InvalidTime(String),

    /// The input is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

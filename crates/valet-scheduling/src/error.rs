//! Error types for the scheduling layer.
//!
//! This module defines all errors that can occur while managing valets,
//! rotas, settings, holidays, availability, and bookings.

use chrono::NaiveDate;
use thiserror::Error;
use valet_core::{BookingId, RotaId, ValetId};
use valet_store::StoreError;

/// A result type using `SchedulingError`.
pub type Result<T> = std::result::Result<T, SchedulingError>;

/// Errors that can occur in scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// The request failed validation.
    #[error("{0}")]
    Validation(String),

    /// The requested valet was not found.
    #[error("valet not found: {0}")]
    ValetNotFound(ValetId),

    /// The requested booking was not found.
    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),

    /// The requested rota was not found.
    #[error("rota not found: {0}")]
    RotaNotFound(RotaId),

    /// The requested holiday was not found.
    #[error("no holiday for valet {valet_id} on {date}")]
    HolidayNotFound {
        /// The valet.
        valet_id: ValetId,
        /// The date that was not a holiday.
        date: NaiveDate,
    },

    /// Slot settings have not been configured yet.
    #[error("no slot settings configured")]
    SettingsNotFound,

    /// The valet has no active rota, so it cannot take bookings.
    #[error("no active rota found for valet {0}")]
    NoActiveRota(ValetId),

    /// The valet is already fully booked on the date.
    #[error(
        "valet {valet_id} has reached their maximum capacity of {max_capacity} bookings \
         for {date}; current bookings: {current_bookings}"
    )]
    CapacityExceeded {
        /// The valet.
        valet_id: ValetId,
        /// The booking date.
        date: NaiveDate,
        /// Capacity for the date's weekday.
        max_capacity: u32,
        /// Open bookings already held.
        current_bookings: u32,
    },

    /// Availability cannot be computed without slot settings.
    #[error("slot settings not configured")]
    ConfigurationMissing,

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl SchedulingError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::NoActiveRota(_) => 400,
            Self::ValetNotFound(_)
            | Self::BookingNotFound(_)
            | Self::RotaNotFound(_)
            | Self::HolidayNotFound { .. }
            | Self::SettingsNotFound => 404,
            Self::CapacityExceeded { .. } => 409,
            Self::ConfigurationMissing | Self::Store(_) => 500,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NoActiveRota(_) => "no_active_rota",
            Self::ValetNotFound(_)
            | Self::BookingNotFound(_)
            | Self::RotaNotFound(_)
            | Self::HolidayNotFound { .. }
            | Self::SettingsNotFound => "not_found",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::ConfigurationMissing => "configuration_missing",
            Self::Store(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        let valet_id = ValetId::generate();
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        assert_eq!(
            SchedulingError::Validation("Name is required".into()).http_status_code(),
            400
        );
        assert_eq!(
            SchedulingError::NoActiveRota(valet_id).http_status_code(),
            400
        );
        assert_eq!(
            SchedulingError::ValetNotFound(valet_id).http_status_code(),
            404
        );
        assert_eq!(SchedulingError::SettingsNotFound.http_status_code(), 404);
        assert_eq!(
            SchedulingError::CapacityExceeded {
                valet_id,
                date,
                max_capacity: 3,
                current_bookings: 3,
            }
            .http_status_code(),
            409
        );
        assert_eq!(SchedulingError::ConfigurationMissing.http_status_code(), 500);
        assert_eq!(
            SchedulingError::Store(StoreError::Database("disk I/O error".into()))
                .http_status_code(),
            500
        );
    }

    #[test]
    fn capacity_message_names_the_numbers() {
        let err = SchedulingError::CapacityExceeded {
            valet_id: ValetId::generate(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            max_capacity: 3,
            current_bookings: 3,
        };
        let message = err.to_string();
        assert!(message.contains("maximum capacity of 3 bookings for 2024-06-10"));
        assert!(message.contains("current bookings: 3"));
        assert_eq!(err.error_code(), "capacity_exceeded");
    }
}

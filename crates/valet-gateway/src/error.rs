//! API error types and responses.
//!
//! This module defines the standard error format for all API responses:
//!
//! ```text
//! { "success": false, "error": "<code>", "message": "<text>" }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use valet_scheduling::SchedulingError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request body, parameters, or business precondition.
    #[error("{message}")]
    BadRequest {
        /// Machine-readable code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The valet is already fully booked for the date.
    #[error("{message}")]
    CapacityExceeded {
        /// Human-readable message.
        message: String,
        /// Capacity for the date.
        max_capacity: u32,
        /// Open bookings already held.
        current_bookings: u32,
    },

    /// The request did not finish within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The service is missing required configuration.
    #[error("{0}")]
    Configuration(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_bookings: Option<u32>,
}

impl ApiError {
    /// Shorthand for a validation failure.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: "validation_error",
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CapacityExceeded { .. } => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { code, .. } => *code,
            Self::NotFound(_) => "not_found",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::Timeout => "request_timeout",
            Self::Configuration(_) => "configuration_missing",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (max_capacity, current_bookings) = match &self {
            Self::CapacityExceeded {
                max_capacity,
                current_bookings,
                ..
            } => (Some(*max_capacity), Some(*current_bookings)),
            _ => (None, None),
        };

        let body = ErrorResponse {
            success: false,
            error: self.code(),
            message: self.to_string(),
            max_capacity,
            current_bookings,
        };

        (status, Json(body)).into_response()
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Validation(message) => Self::bad_request(message),
            SchedulingError::NoActiveRota(_) => Self::BadRequest {
                code: "no_active_rota",
                message: "No active rota found for this valet".to_string(),
            },
            SchedulingError::ValetNotFound(_) => Self::NotFound("Valet not found".to_string()),
            SchedulingError::BookingNotFound(_) => {
                Self::NotFound("Booking not found".to_string())
            }
            SchedulingError::RotaNotFound(_) => Self::NotFound("Rota not found".to_string()),
            SchedulingError::HolidayNotFound { .. } => {
                Self::NotFound("Holiday not found".to_string())
            }
            SchedulingError::SettingsNotFound => {
                Self::NotFound("No slot settings configured".to_string())
            }
            SchedulingError::CapacityExceeded {
                date,
                max_capacity,
                current_bookings,
                ..
            } => Self::CapacityExceeded {
                message: format!(
                    "This valet has reached their maximum capacity of {max_capacity} bookings \
                     for {date}. Current bookings: {current_bookings}."
                ),
                max_capacity,
                current_bookings,
            },
            SchedulingError::ConfigurationMissing => {
                tracing::error!("Slot settings not configured");
                Self::Configuration("Settings not configured".to_string())
            }
            SchedulingError::Store(store_err) => {
                tracing::error!(error = %store_err, "Store error");
                Self::Internal(store_err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

//! Booking endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use valet_core::BookingId;
use valet_scheduling::{BookingListQuery, CreateBookingRequest, Scheduling};
use valet_store::{Booking, BookingStatus};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response for booking lists.
#[derive(Debug, Serialize)]
pub struct ListBookingsResponse {
    /// Always `true`.
    pub success: bool,
    /// The bookings.
    pub data: Vec<Booking>,
    /// Number of bookings returned.
    pub count: usize,
}

impl From<Vec<Booking>> for ListBookingsResponse {
    fn from(data: Vec<Booking>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Response for booking creation.
#[derive(Debug, Serialize)]
pub struct BookingCreatedResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: &'static str,
    /// The new booking.
    pub booking_id: BookingId,
    /// Human-readable reference.
    pub booking_code: String,
}

/// Response for marking a booking completed.
#[derive(Debug, Serialize)]
pub struct BookingCompletedResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: &'static str,
    /// The booking.
    pub booking_id: BookingId,
    /// Always `completed`.
    pub status: BookingStatus,
}

/// Response for booking deletion.
#[derive(Debug, Serialize)]
pub struct BookingDeletedResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: &'static str,
    /// The deleted booking.
    pub deleted_id: BookingId,
}

// =============================================================================
// Handlers
// =============================================================================

/// List bookings, newest date first.
///
/// Accepts `filterStatus`, `filterSource`, and `searchTerm` query
/// parameters; `all` disables a filter.
///
/// # Errors
///
/// Returns 400 for an unknown status.
pub async fn list_bookings<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiQuery(query): ApiQuery<BookingListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let bookings = state.scheduling.list_bookings(&query).await?;
    Ok(Json(ListBookingsResponse::from(bookings)))
}

/// Bookings not yet completed, ordered by date then time.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn bookings_by_date<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let bookings = state.scheduling.bookings_by_date().await?;
    Ok(Json(ListBookingsResponse::from(bookings)))
}

/// Create a booking.
///
/// # Errors
///
/// Returns 400 for missing fields or a valet without an active rota, and 409
/// when the valet is fully booked for the date.
pub async fn create_booking<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiJson(body): ApiJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let booking = state.scheduling.create_booking(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse {
            success: true,
            message: "Booking created successfully",
            booking_id: booking.booking_id,
            booking_code: booking.booking_code,
        }),
    ))
}

/// Mark a booking completed.
///
/// # Errors
///
/// Returns 404 if the booking doesn't exist.
pub async fn complete_booking<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiPath(booking_id): ApiPath<BookingId>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let booking = state.scheduling.complete_booking(&booking_id).await?;

    Ok(Json(BookingCompletedResponse {
        success: true,
        message: "Booking marked as completed",
        booking_id: booking.booking_id,
        status: booking.status,
    }))
}

/// Delete a booking.
///
/// # Errors
///
/// Returns 404 if the booking doesn't exist.
pub async fn delete_booking<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiPath(booking_id): ApiPath<BookingId>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    state.scheduling.delete_booking(&booking_id).await?;

    Ok(Json(BookingDeletedResponse {
        success: true,
        message: "Booking deleted successfully",
        deleted_id: booking_id,
    }))
}

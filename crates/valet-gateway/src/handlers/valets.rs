//! Valet management and holiday endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;

use valet_core::ValetId;
use valet_scheduling::{parse_request_date, HolidayRequest, Scheduling, ValetRequest};
use valet_store::Valet;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response for valet list.
#[derive(Debug, Serialize)]
pub struct ListValetsResponse {
    /// Always `true`.
    pub success: bool,
    /// Valets ordered by name.
    pub data: Vec<Valet>,
}

/// Response for valet creation.
#[derive(Debug, Serialize)]
pub struct ValetCreatedResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: &'static str,
    /// The new valet.
    pub valet_id: ValetId,
}

/// Response for valet update.
#[derive(Debug, Serialize)]
pub struct ValetUpdatedResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: &'static str,
    /// The valet after the update.
    pub data: Valet,
}

/// Response with only a confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: &'static str,
}

/// Response for holiday list.
#[derive(Debug, Serialize)]
pub struct ListHolidaysResponse {
    /// Always `true`.
    pub success: bool,
    /// The valet.
    pub valet_id: ValetId,
    /// Holiday dates, ascending.
    pub data: Vec<NaiveDate>,
    /// Number of holidays.
    pub count: usize,
}

/// Response for a holiday change.
#[derive(Debug, Serialize)]
pub struct HolidayResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: &'static str,
    /// The valet.
    pub valet_id: ValetId,
    /// The date.
    pub holiday_date: NaiveDate,
}

// =============================================================================
// Valet Handlers
// =============================================================================

/// List all valets.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn list_valets<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let valets = state.scheduling.list_valets().await?;

    Ok(Json(ListValetsResponse {
        success: true,
        data: valets,
    }))
}

/// Create a valet with a Monday to Friday rota.
///
/// # Errors
///
/// Returns 400 if the name is missing.
pub async fn create_valet<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiJson(body): ApiJson<ValetRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let valet = state.scheduling.create_valet(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ValetCreatedResponse {
            success: true,
            message: "Valet created successfully",
            valet_id: valet.valet_id,
        }),
    ))
}

/// Update a valet.
///
/// # Errors
///
/// Returns 400 if the name is missing and 404 if the valet doesn't exist.
pub async fn update_valet<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiPath(valet_id): ApiPath<ValetId>,
    ApiJson(body): ApiJson<ValetRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let valet = state.scheduling.update_valet(&valet_id, body).await?;

    Ok(Json(ValetUpdatedResponse {
        success: true,
        message: "Valet updated successfully",
        data: valet,
    }))
}

/// Delete a valet with its bookings, holidays, overrides, and rota.
///
/// # Errors
///
/// Returns 404 if the valet doesn't exist.
pub async fn delete_valet<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiPath(valet_id): ApiPath<ValetId>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    state.scheduling.delete_valet(&valet_id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Valet deleted successfully",
    }))
}

// =============================================================================
// Holiday Handlers
// =============================================================================

/// List a valet's holidays.
///
/// # Errors
///
/// Returns 404 if the valet doesn't exist.
pub async fn list_holidays<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiPath(valet_id): ApiPath<ValetId>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let holidays = state.scheduling.list_holidays(&valet_id).await?;

    Ok(Json(ListHolidaysResponse {
        success: true,
        valet_id,
        count: holidays.len(),
        data: holidays,
    }))
}

/// Mark a valet as off on a date. Adding an existing holiday is a no-op.
///
/// # Errors
///
/// Returns 400 for a malformed date and 404 if the valet doesn't exist.
pub async fn add_holiday<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiPath(valet_id): ApiPath<ValetId>,
    ApiJson(body): ApiJson<HolidayRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let date = parse_request_date(&body.holiday_date)?;
    state.scheduling.add_holiday(&valet_id, date).await?;

    Ok((
        StatusCode::CREATED,
        Json(HolidayResponse {
            success: true,
            message: "Holiday added",
            valet_id,
            holiday_date: date,
        }),
    ))
}

/// Remove a holiday.
///
/// # Errors
///
/// Returns 400 for a malformed date and 404 if there was no such holiday.
pub async fn remove_holiday<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiPath((valet_id, date)): ApiPath<(ValetId, String)>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let date = parse_request_date(&date)?;
    state.scheduling.remove_holiday(&valet_id, date).await?;

    Ok(Json(HolidayResponse {
        success: true,
        message: "Holiday removed",
        valet_id,
        holiday_date: date,
    }))
}

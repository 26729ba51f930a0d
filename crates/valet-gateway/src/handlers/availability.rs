//! Availability endpoints.
//!
//! The batch endpoint feeds calendar views with per-date slot totals; the
//! detail endpoint lists the open slots of one day.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use valet_core::{format_date, ValetId};
use valet_scheduling::{
    parse_request_date, AvailabilityBatchRequest, BatchAvailability, DayAvailability, DayOutcome,
    Scheduling, SlotDetail, SlotInfo,
};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response for batch availability.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// Always `true`.
    pub success: bool,
    /// The valet.
    pub valet_id: ValetId,
    /// `{available, total}` keyed by `YYYY-MM-DD`. Empty without an active rota.
    pub availability: BTreeMap<String, DayAvailability>,
    /// Summary text.
    pub message: String,
}

/// Response for single-date slot detail.
#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    /// Always `true`.
    pub success: bool,
    /// The requested date.
    pub date: String,
    /// The valet.
    pub valet_id: ValetId,
    /// Detail for an open day or the reason it is closed.
    #[serde(flatten)]
    pub day: DayBody,
}

/// Body of a slot detail response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DayBody {
    /// The valet does not work this day.
    Closed {
        /// Always empty.
        slots: Vec<SlotInfo>,
        /// Why the day is closed.
        message: String,
    },
    /// Slot detail for an open day.
    Open(SlotDetail),
}

// =============================================================================
// Handlers
// =============================================================================

/// Slot totals for many dates in one request.
///
/// # Example
///
/// ```text
/// POST /api/availability/batch
/// { "valet_id": "…", "dates": ["2024-06-10", "2024-06-15"] }
///
/// Response: 200 OK
/// {
///   "success": true,
///   "valet_id": "…",
///   "availability": {
///     "2024-06-10": { "available": 13, "total": 14 },
///     "2024-06-15": { "available": 0, "total": 0 }
///   },
///   "message": "Batch loaded 2 dates"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 for a malformed body, 404 for an unknown valet, and 500 when
/// slot settings are missing.
pub async fn batch<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiJson(body): ApiJson<AvailabilityBatchRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let (valet_id, dates) = body.validate()?;
    let result = state
        .scheduling
        .batch_availability(&valet_id, &dates)
        .await?;

    let response = match result {
        BatchAvailability::NoActiveRota => BatchResponse {
            success: true,
            valet_id,
            availability: BTreeMap::new(),
            message: "No active rota".to_string(),
        },
        BatchAvailability::Dates(days) => BatchResponse {
            success: true,
            valet_id,
            availability: days
                .into_iter()
                .map(|(date, day)| (format_date(date), day))
                .collect(),
            message: format!("Batch loaded {} dates", dates.len()),
        },
    };

    Ok(Json(response))
}

/// Open slots for one valet and date.
///
/// Closed days answer 200 with an empty `slots` list and the reason in
/// `message`.
///
/// # Errors
///
/// Returns 400 for a malformed date, 404 for an unknown valet, and 500 when
/// slot settings are missing.
pub async fn slots<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiPath((valet_id, date)): ApiPath<(ValetId, String)>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let parsed = parse_request_date(&date)
        .map_err(|_| ApiError::bad_request("Invalid date format"))?;
    let outcome = state.scheduling.slot_detail(&valet_id, parsed).await?;

    let day = match outcome {
        DayOutcome::Closed(reason) => DayBody::Closed {
            slots: Vec::new(),
            message: reason.to_string(),
        },
        DayOutcome::Open(detail) => DayBody::Open(detail),
    };

    Ok(Json(SlotsResponse {
        success: true,
        date,
        valet_id,
        day,
    }))
}

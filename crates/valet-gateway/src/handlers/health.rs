//! Health check endpoint.
//!
//! Reports whether the service has enough configuration to take bookings.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use valet_scheduling::Scheduling;

use crate::error::ApiError;
use crate::state::GatewayState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `true` when the checks ran.
    pub success: bool,
    /// `ready` or `incomplete`.
    pub status: &'static str,
    /// Per-table configuration checks.
    pub checks: HealthChecks,
}

/// Configuration checks by table.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Slot settings rows.
    pub booking_slot_settings: Check,
    /// Active valets.
    pub valets: Check,
    /// Active rotas.
    pub valet_rota: Check,
}

/// A single configuration check.
#[derive(Debug, Serialize)]
pub struct Check {
    /// At least one row exists.
    pub configured: bool,
    /// Number of matching rows.
    pub count: u64,
}

impl Check {
    const fn of(count: u64) -> Self {
        Self {
            configured: count > 0,
            count,
        }
    }
}

/// Health check handler.
///
/// # Example
///
/// ```text
/// GET /api/health
///
/// Response: 200 OK
/// {
///   "success": true,
///   "status": "ready",
///   "checks": {
///     "booking_slot_settings": { "configured": true, "count": 1 },
///     "valets": { "configured": true, "count": 4 },
///     "valet_rota": { "configured": true, "count": 4 }
///   }
/// }
/// ```
///
/// # Errors
///
/// Returns an error if the counts cannot be read.
pub async fn health<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let report = state.scheduling.health().await?;

    Ok(Json(HealthResponse {
        success: true,
        status: if report.ready { "ready" } else { "incomplete" },
        checks: HealthChecks {
            booking_slot_settings: Check::of(report.counts.slot_settings),
            valets: Check::of(report.counts.active_valets),
            valet_rota: Check::of(report.counts.active_rotas),
        },
    }))
}

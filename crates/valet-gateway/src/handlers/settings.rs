//! Slot settings and rota endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use valet_core::{RotaId, ValetId};
use valet_scheduling::{RotaUpdateRequest, Scheduling, SlotSettingsRequest};
use valet_store::{RotaSummary, SlotSettings};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response carrying the slot settings.
#[derive(Debug, Serialize)]
pub struct SlotSettingsResponse {
    /// Always `true`.
    pub success: bool,
    /// Set on writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// The settings.
    pub data: SlotSettings,
}

/// One active rota, flattened to `<day>_available` / `<day>_capacity` fields.
#[derive(Debug, Serialize)]
pub struct RotaResponse {
    /// Rota ID.
    pub rota_id: RotaId,
    /// Valet ID.
    pub valet_id: ValetId,
    /// Valet name.
    pub name: Option<String>,
    /// Per-day fields.
    #[serde(flatten)]
    pub days: Map<String, Value>,
    /// Whether the rota is in use.
    pub is_active: bool,
    /// Who last changed the rota.
    pub updated_by: Option<String>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<RotaSummary> for RotaResponse {
    fn from(summary: RotaSummary) -> Self {
        let rota = summary.rota;
        let mut days = Map::new();
        for (weekday, day) in rota.days.iter() {
            days.insert(format!("{weekday}_available"), Value::from(day.available));
            days.insert(format!("{weekday}_capacity"), Value::from(day.capacity));
        }

        Self {
            rota_id: rota.rota_id,
            valet_id: rota.valet_id,
            name: summary.valet_name,
            days,
            is_active: rota.is_active,
            updated_by: rota.updated_by,
            updated_at: rota.updated_at,
        }
    }
}

/// Response for rota list.
#[derive(Debug, Serialize)]
pub struct ListRotasResponse {
    /// Always `true`.
    pub success: bool,
    /// Active rotas ordered by valet name.
    pub data: Vec<RotaResponse>,
}

/// Response for a rota update.
#[derive(Debug, Serialize)]
pub struct RotaUpdatedResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: &'static str,
    /// The updated rota.
    pub rota_id: RotaId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Get the slot settings.
///
/// # Errors
///
/// Returns 404 if no settings have been saved yet.
pub async fn get_slot_settings<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let settings = state.scheduling.get_slot_settings().await?;

    Ok(Json(SlotSettingsResponse {
        success: true,
        message: None,
        data: settings,
    }))
}

/// Replace the slot settings.
///
/// # Errors
///
/// Returns 400 if the body is malformed or the settings are inconsistent.
pub async fn update_slot_settings<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiJson(body): ApiJson<SlotSettingsRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let settings = state.scheduling.update_slot_settings(body).await?;

    Ok(Json(SlotSettingsResponse {
        success: true,
        message: Some("Settings updated successfully"),
        data: settings,
    }))
}

/// List active rotas with valet names.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn list_rotas<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let rotas = state.scheduling.list_rotas().await?;

    Ok(Json(ListRotasResponse {
        success: true,
        data: rotas.into_iter().map(RotaResponse::from).collect(),
    }))
}

/// Replace a rota's weekly schedule.
///
/// # Errors
///
/// Returns 400 without a `rota_id` and 404 if the rota doesn't exist.
pub async fn update_rota<C>(
    State(state): State<Arc<GatewayState<C>>>,
    ApiJson(body): ApiJson<RotaUpdateRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Scheduling + 'static,
{
    let rota_id = state.scheduling.update_rota(body).await?;

    Ok(Json(RotaUpdatedResponse {
        success: true,
        message: "Rota updated successfully",
        rota_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::Weekday;
    use valet_store::{Rota, WeekSchedule};

    #[test]
    fn rota_response_flattens_days() {
        let rota = Rota {
            rota_id: RotaId::generate(),
            valet_id: ValetId::generate(),
            days: WeekSchedule::weekdays_only(),
            is_active: true,
            updated_by: Some("system".to_string()),
            updated_at: Utc::now(),
        };
        let response = RotaResponse::from(RotaSummary {
            rota,
            valet_name: Some("Jordan".to_string()),
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["name"], "Jordan");
        assert_eq!(json["monday_available"], true);
        assert_eq!(json["saturday_available"], false);
        assert_eq!(json["monday_capacity"], Value::Null);
        assert_eq!(json["is_active"], true);
        for weekday in Weekday::ALL {
            assert!(json.get(format!("{weekday}_available")).is_some());
        }
    }
}

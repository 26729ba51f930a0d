//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::routing::{delete, get, post, put};
use axum::{BoxError, Router};
use tower::timeout::error::Elapsed;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use valet_scheduling::Scheduling;

use crate::error::ApiError;
use crate::handlers::{availability, bookings, health, settings, valets};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// All routes are nested under `/api`.
///
/// ## Health
/// - `GET /health` - Configuration readiness
///
/// ## Settings
/// - `GET /settings/slot-settings` - Get slot settings
/// - `PUT /settings/slot-settings` - Replace slot settings
/// - `GET /settings/valet-rota` - List active rotas
/// - `POST /settings/valet-rota` - Update a rota
///
/// ## Valets
/// - `GET /valets` - List valets
/// - `POST /valets` - Create valet
/// - `PUT /valets/:valet_id` - Update valet
/// - `DELETE /valets/:valet_id` - Delete valet
/// - `GET /valets/:valet_id/holidays` - List holidays
/// - `POST /valets/:valet_id/holidays` - Add holiday
/// - `DELETE /valets/:valet_id/holidays/:date` - Remove holiday
///
/// ## Availability
/// - `POST /availability/batch` - Slot totals per date
/// - `GET /availability/slots/:valet_id/:date` - Slot detail for one date
///
/// ## Bookings
/// - `GET /valet-bookings` - List bookings
/// - `GET /valet-bookings/grouped/by-date` - Open bookings by date
/// - `POST /valet-bookings` - Create booking
/// - `PUT /valet-bookings/:booking_id` - Mark completed
/// - `DELETE /valet-bookings/:booking_id` - Delete booking
pub fn create_router<C>(state: GatewayState<C>) -> Router
where
    C: Scheduling + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    let api = Router::new()
        // Health
        .route("/health", get(health::health::<C>))
        // Settings
        .route(
            "/settings/slot-settings",
            get(settings::get_slot_settings::<C>).put(settings::update_slot_settings::<C>),
        )
        .route(
            "/settings/valet-rota",
            get(settings::list_rotas::<C>).post(settings::update_rota::<C>),
        )
        // Valets
        .route(
            "/valets",
            get(valets::list_valets::<C>).post(valets::create_valet::<C>),
        )
        .route(
            "/valets/:valet_id",
            put(valets::update_valet::<C>).delete(valets::delete_valet::<C>),
        )
        .route(
            "/valets/:valet_id/holidays",
            get(valets::list_holidays::<C>).post(valets::add_holiday::<C>),
        )
        .route(
            "/valets/:valet_id/holidays/:date",
            delete(valets::remove_holiday::<C>),
        )
        // Availability
        .route("/availability/batch", post(availability::batch::<C>))
        .route(
            "/availability/slots/:valet_id/:date",
            get(availability::slots::<C>),
        )
        // Bookings
        .route(
            "/valet-bookings",
            get(bookings::list_bookings::<C>).post(bookings::create_booking::<C>),
        )
        .route(
            "/valet-bookings/grouped/by-date",
            get(bookings::bookings_by_date::<C>),
        )
        .route(
            "/valet-bookings/:booking_id",
            put(bookings::complete_booking::<C>).delete(bookings::delete_booking::<C>),
        );

    let router = Router::new()
        .nest("/api", api)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes));

    with_timeout(router, request_timeout).with_state(state)
}

/// Abort requests running longer than `timeout` with a 408 error envelope.
fn with_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .timeout(timeout),
    )
}

#[allow(clippy::unused_async)]
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        ApiError::Timeout
    } else {
        tracing::error!(error = %err, "Middleware error");
        ApiError::Internal(err.to_string())
    }
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    #[test]
    fn cors_any_origin() {
        let origins = vec!["*".to_string()];
        let _layer = build_cors_layer(&origins);
    }

    #[test]
    fn cors_specific_origins() {
        let origins = vec![
            "http://localhost:5173".to_string(),
            "https://valet.example.com".to_string(),
        ];
        let _layer = build_cors_layer(&origins);
    }

    #[tokio::test]
    async fn timeout_returns_error_envelope() {
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "done"
            }),
        );
        let server = TestServer::new(with_timeout(slow, Duration::from_millis(50))).unwrap();

        let response = server.get("/slow").await;
        response.assert_status(StatusCode::REQUEST_TIMEOUT);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "request_timeout");
        assert_eq!(body["message"], "Request timed out");
    }

    #[tokio::test]
    async fn fast_requests_pass_the_timeout() {
        let fast = Router::new().route("/fast", get(|| async { "done" }));
        let server = TestServer::new(with_timeout(fast, Duration::from_secs(5))).unwrap();

        let response = server.get("/fast").await;
        response.assert_status_ok();
        response.assert_text("done");
    }
}

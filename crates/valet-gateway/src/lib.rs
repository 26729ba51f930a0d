//! HTTP gateway for the valet booking service.
//!
//! This crate provides the REST API used by the booking front end. It handles:
//!
//! - JSON endpoints for settings, valets, holidays, availability, and bookings
//! - A uniform `{ success, error, message }` error envelope
//! - Request tracing, CORS, body limits, and request timeouts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Clients                              │
//! │                        (HTTP)                               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      valet-gateway                          │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │ Extractors  │ │   Router    │ │    Error            │    │
//! │  │             │ │ + Handlers  │ │    Envelope         │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                    ┌───────────────────┐
//!                    │ SchedulingService │
//!                    └───────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use valet_gateway::{create_router, GatewayConfig, GatewayState};
//! use valet_scheduling::SchedulingService;
//! use valet_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::open("/tmp/valet.db").await?);
//! let scheduling = Arc::new(SchedulingService::with_defaults(store));
//!
//! let state = GatewayState::new(scheduling, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;

//! Scheduling logic for the valet booking service.
//!
//! This crate holds the business rules: slot generation, per-date
//! availability, and the daily capacity guard. It coordinates the storage
//! layer and exposes one async trait for the HTTP gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Gateway (HTTP)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SchedulingService                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │ Valets and  │ │ Availability│ │  Bookings and       │    │
//! │  │ Rotas       │ │ Engine      │ │  Capacity Guard     │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       ┌────────────┐
//!                       │   Store    │
//!                       │  (SQLite)  │
//!                       └────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use valet_scheduling::{Scheduling, SchedulingService, ValetRequest};
//! use valet_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::open("/tmp/valet.db").await?);
//! let scheduling = SchedulingService::with_defaults(store);
//!
//! let valet = scheduling.create_valet(ValetRequest::new("Jordan")).await?;
//! println!("Created valet: {}", valet.valet_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Availability
//!
//! A date is closed when the valet has no active rota, the date is in the
//! past, the rota marks the weekday off, or the valet is on holiday, checked
//! in that order. See the [`availability`] module.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod availability;
pub mod capacity;
pub mod error;
pub mod service;
pub mod types;

pub use availability::{
    BatchAvailability, ClosedReason, DayAvailability, DayOutcome, SlotDetail, SlotInfo,
};
pub use capacity::{check_capacity, CapacityCheck};
pub use error::{Result, SchedulingError};
pub use service::{Scheduling, SchedulingService};
pub use types::{
    parse_request_date, AvailabilityBatchRequest, BookingListQuery, CreateBookingRequest,
    HealthReport, HolidayRequest, RotaUpdateRequest, SchedulingConfig, SlotSettingsRequest,
    ValetRequest, MAX_LEAD_TIME_HOURS,
};

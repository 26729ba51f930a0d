//! Relational storage layer for the valet booking service.
//!
//! This crate provides persistent storage for slot settings, valets, rotas,
//! bookings, and holidays on SQLite through a bounded `sqlx` connection pool.
//!
//! # Architecture
//!
//! The storage uses the following tables:
//!
//! - `booking_slot_settings`: The singleton slot template
//! - `valets`: Valet records, keyed by `valet_id`
//! - `valet_rota`: Weekly rotas, one active row per valet
//! - `valet_bookings`: Customer bookings, indexed by `(valet_id, booking_date)`
//! - `valet_holidays`: Days a valet is fully unavailable
//! - `valet_slot_overrides`: Referenced only by the valet delete cascade
//!
//! # Example
//!
//! ```no_run
//! use valet_store::{SqliteStore, Store, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::connect(&StoreConfig::default()).await?;
//! let valets = store.list_valets().await?;
//! # let _ = valets;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
mod rows;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;
pub use types::{
    Booking, BookingCounts, BookingFilter, BookingStatus, DaySchedule, HealthCounts, Rota,
    RotaSummary, SlotSettings, Valet, ValetStatus, WeekSchedule, DEFAULT_DAILY_CAPACITY,
};

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use valet_core::{BookingId, RotaId, ValetId};

/// The storage trait defining all database operations.
///
/// Every call acquires a pooled connection for its duration and returns it
/// on every exit path.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Health
    // =========================================================================

    /// Count configured settings rows, active valets, and active rotas.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn health_counts(&self) -> Result<HealthCounts>;

    // =========================================================================
    // Slot Settings
    // =========================================================================

    /// Get the singleton slot settings, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_slot_settings(&self) -> Result<Option<SlotSettings>>;

    /// Insert or replace the singleton slot settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_slot_settings(&self, settings: &SlotSettings, updated_by: &str) -> Result<()>;

    // =========================================================================
    // Valet Operations
    // =========================================================================

    /// Insert a valet together with its initial rota, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_valet(&self, valet: &Valet, rota: &Rota) -> Result<()>;

    /// Get a valet by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_valet(&self, valet_id: &ValetId) -> Result<Option<Valet>>;

    /// List all valets ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_valets(&self) -> Result<Vec<Valet>>;

    /// Update a valet's name, contact details, and status.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the valet doesn't exist.
    async fn update_valet(&self, valet: &Valet) -> Result<()>;

    /// Delete a valet and every row that references it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the valet doesn't exist; nothing is
    /// deleted in that case.
    async fn delete_valet(&self, valet_id: &ValetId) -> Result<()>;

    // =========================================================================
    // Rota Operations
    // =========================================================================

    /// Get the active rota for a valet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_active_rota(&self, valet_id: &ValetId) -> Result<Option<Rota>>;

    /// List all active rotas with their valet names, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_active_rotas(&self) -> Result<Vec<RotaSummary>>;

    /// Replace the seven day schedules of a rota.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the rota doesn't exist.
    async fn update_rota_schedule(
        &self,
        rota_id: &RotaId,
        days: &WeekSchedule,
        updated_by: &str,
    ) -> Result<()>;

    // =========================================================================
    // Holiday Operations
    // =========================================================================

    /// Mark a valet as off on a date. Adding an existing holiday is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn add_holiday(&self, valet_id: &ValetId, date: NaiveDate) -> Result<()>;

    /// Remove a holiday.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if there was no such holiday.
    async fn remove_holiday(&self, valet_id: &ValetId, date: NaiveDate) -> Result<()>;

    /// List a valet's holidays in date order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_holidays(&self, valet_id: &ValetId) -> Result<Vec<NaiveDate>>;

    /// The subset of `dates` that are holidays for the valet, in one query.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn holidays_among(
        &self,
        valet_id: &ValetId,
        dates: &[NaiveDate],
    ) -> Result<HashSet<NaiveDate>>;

    // =========================================================================
    // Booking Operations
    // =========================================================================

    /// Open booking counts per `(date, slot time)` for the given dates, in one
    /// aggregated query. Bookings without a slot time are not counted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn booking_counts(&self, valet_id: &ValetId, dates: &[NaiveDate])
        -> Result<BookingCounts>;

    /// Number of open bookings a valet holds on a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_open_bookings(&self, valet_id: &ValetId, date: NaiveDate) -> Result<u32>;

    /// Insert a booking only if the valet holds fewer than `max_capacity`
    /// open bookings on its date. The count and the insert are one statement.
    ///
    /// Returns `false` when the valet was already at capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn insert_booking_within_capacity(
        &self,
        booking: &Booking,
        max_capacity: u32,
    ) -> Result<bool>;

    /// Get a booking by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_booking(&self, booking_id: &BookingId) -> Result<Option<Booking>>;

    /// List bookings matching a filter, latest booking date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>>;

    /// List every booking not yet completed, by date then time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_uncompleted_bookings(&self) -> Result<Vec<Booking>>;

    /// Mark a booking completed and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the booking doesn't exist.
    async fn complete_booking(&self, booking_id: &BookingId) -> Result<Booking>;

    /// Delete a booking.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the booking doesn't exist.
    async fn delete_booking(&self, booking_id: &BookingId) -> Result<()>;
}

//! Scheduling service implementation.
//!
//! This module provides the `Scheduling` trait and `SchedulingService`
//! implementation that fetches inputs from the store and runs the availability
//! engine and capacity guard over them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use valet_core::{BookingId, RotaId, ValetId};
use valet_store::{
    Booking, Rota, RotaSummary, SlotSettings, Store, StoreError, Valet, WeekSchedule,
};

use crate::availability::{self, BatchAvailability, ClosedReason, DayOutcome, Inputs};
use crate::capacity;
use crate::error::{Result, SchedulingError};
use crate::types::{
    BookingListQuery, CreateBookingRequest, HealthReport, RotaUpdateRequest, SchedulingConfig,
    SlotSettingsRequest, ValetRequest,
};

/// Trait defining the scheduling operations.
///
/// This trait provides the complete API behind the HTTP gateway.
#[async_trait]
pub trait Scheduling: Send + Sync {
    // =========================================================================
    // Health
    // =========================================================================

    /// Report whether settings, valets, and rotas are configured.
    async fn health(&self) -> Result<HealthReport>;

    // =========================================================================
    // Settings
    // =========================================================================

    /// Get the slot settings.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::SettingsNotFound` if none are configured.
    async fn get_slot_settings(&self) -> Result<SlotSettings>;

    /// Validate and store new slot settings.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` if the settings are inconsistent.
    async fn update_slot_settings(&self, request: SlotSettingsRequest) -> Result<SlotSettings>;

    /// List all active rotas with valet names.
    async fn list_rotas(&self) -> Result<Vec<RotaSummary>>;

    /// Replace a rota's weekly schedule.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` if no rota ID was given.
    /// Returns `SchedulingError::RotaNotFound` if the rota doesn't exist.
    async fn update_rota(&self, request: RotaUpdateRequest) -> Result<RotaId>;

    // =========================================================================
    // Valets
    // =========================================================================

    /// List all valets by name.
    async fn list_valets(&self) -> Result<Vec<Valet>>;

    /// Create a valet with the default weekday rota.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` if the name is blank.
    async fn create_valet(&self, request: ValetRequest) -> Result<Valet>;

    /// Update a valet's details.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::ValetNotFound` if the valet doesn't exist.
    async fn update_valet(&self, valet_id: &ValetId, request: ValetRequest) -> Result<Valet>;

    /// Delete a valet and everything that references it.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::ValetNotFound` if the valet doesn't exist.
    async fn delete_valet(&self, valet_id: &ValetId) -> Result<()>;

    // =========================================================================
    // Holidays
    // =========================================================================

    /// List a valet's holidays.
    async fn list_holidays(&self, valet_id: &ValetId) -> Result<Vec<NaiveDate>>;

    /// Mark a valet as off on a date.
    async fn add_holiday(&self, valet_id: &ValetId, date: NaiveDate) -> Result<()>;

    /// Remove a holiday.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::HolidayNotFound` if there was no such holiday.
    async fn remove_holiday(&self, valet_id: &ValetId, date: NaiveDate) -> Result<()>;

    // =========================================================================
    // Availability
    // =========================================================================

    /// Slot totals for each requested date.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::ConfigurationMissing` without slot settings.
    /// Returns `SchedulingError::ValetNotFound` if the valet doesn't exist.
    async fn batch_availability(
        &self,
        valet_id: &ValetId,
        dates: &[NaiveDate],
    ) -> Result<BatchAvailability>;

    /// Per-slot detail for one date.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::ConfigurationMissing` without slot settings.
    /// Returns `SchedulingError::ValetNotFound` if the valet doesn't exist.
    async fn slot_detail(&self, valet_id: &ValetId, date: NaiveDate) -> Result<DayOutcome>;

    // =========================================================================
    // Bookings
    // =========================================================================

    /// List bookings, newest date first.
    async fn list_bookings(&self, query: &BookingListQuery) -> Result<Vec<Booking>>;

    /// List bookings not yet completed, by date then time.
    async fn bookings_by_date(&self) -> Result<Vec<Booking>>;

    /// Create a booking if the valet has capacity on its date.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` for missing or malformed fields.
    /// Returns `SchedulingError::NoActiveRota` if the valet has no active rota.
    /// Returns `SchedulingError::CapacityExceeded` if the valet is fully booked.
    async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking>;

    /// Mark a booking completed.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::BookingNotFound` if the booking doesn't exist.
    async fn complete_booking(&self, booking_id: &BookingId) -> Result<Booking>;

    /// Delete a booking.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::BookingNotFound` if the booking doesn't exist.
    async fn delete_booking(&self, booking_id: &BookingId) -> Result<()>;
}

/// Map `StoreError::NotFound` to a specific error, passing others through.
fn not_found(err: StoreError, missing: SchedulingError) -> SchedulingError {
    match err {
        StoreError::NotFound => missing,
        other => SchedulingError::Store(other),
    }
}

/// The main scheduling service implementation.
pub struct SchedulingService<S: Store> {
    store: Arc<S>,
    config: SchedulingConfig,
}

impl<S: Store> SchedulingService<S> {
    /// Create a new scheduling service.
    #[must_use]
    pub fn new(store: Arc<S>, config: SchedulingConfig) -> Self {
        Self { store, config }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, SchedulingConfig::default())
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    async fn require_valet(&self, valet_id: &ValetId) -> Result<Valet> {
        self.store
            .get_valet(valet_id)
            .await?
            .ok_or(SchedulingError::ValetNotFound(*valet_id))
    }

    async fn require_settings(&self) -> Result<SlotSettings> {
        self.store
            .get_slot_settings()
            .await?
            .ok_or(SchedulingError::ConfigurationMissing)
    }
}

#[async_trait]
impl<S: Store + 'static> Scheduling for SchedulingService<S> {
    // =========================================================================
    // Health
    // =========================================================================

    async fn health(&self) -> Result<HealthReport> {
        let report = HealthReport::from(self.store.health_counts().await?);
        tracing::debug!(ready = report.ready, "Health check");
        Ok(report)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    async fn get_slot_settings(&self) -> Result<SlotSettings> {
        self.store
            .get_slot_settings()
            .await?
            .ok_or(SchedulingError::SettingsNotFound)
    }

    async fn update_slot_settings(&self, request: SlotSettingsRequest) -> Result<SlotSettings> {
        let settings = request.validate()?;
        let updated_by = request.updated_by.as_deref().unwrap_or("system");

        self.store.put_slot_settings(&settings, updated_by).await?;

        tracing::info!(
            start = %settings.slot_start_time,
            end = %settings.slot_end_time,
            duration = settings.slot_duration_minutes,
            updated_by,
            "Updated slot settings"
        );

        Ok(settings)
    }

    async fn list_rotas(&self) -> Result<Vec<RotaSummary>> {
        Ok(self.store.list_active_rotas().await?)
    }

    async fn update_rota(&self, request: RotaUpdateRequest) -> Result<RotaId> {
        let rota_id = request.rota_id()?;
        let updated_by = request.updated_by.as_deref().unwrap_or("admin");

        self.store
            .update_rota_schedule(&rota_id, &request.schedule(), updated_by)
            .await
            .map_err(|e| not_found(e, SchedulingError::RotaNotFound(rota_id)))?;

        tracing::info!(rota_id = %rota_id, updated_by, "Updated rota");

        Ok(rota_id)
    }

    // =========================================================================
    // Valets
    // =========================================================================

    async fn list_valets(&self) -> Result<Vec<Valet>> {
        Ok(self.store.list_valets().await?)
    }

    async fn create_valet(&self, request: ValetRequest) -> Result<Valet> {
        let name = request.validated_name()?;
        let now = Utc::now();

        let valet = Valet {
            valet_id: ValetId::generate(),
            name,
            email: request.email,
            phone: request.phone,
            status: request.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        let rota = Rota {
            rota_id: RotaId::generate(),
            valet_id: valet.valet_id,
            days: WeekSchedule::weekdays_only(),
            is_active: true,
            updated_by: Some("system".to_string()),
            updated_at: now,
        };

        self.store.create_valet(&valet, &rota).await?;

        tracing::info!(
            valet_id = %valet.valet_id,
            rota_id = %rota.rota_id,
            name = %valet.name,
            "Created valet"
        );

        Ok(valet)
    }

    async fn update_valet(&self, valet_id: &ValetId, request: ValetRequest) -> Result<Valet> {
        let name = request.validated_name()?;
        let mut valet = self.require_valet(valet_id).await?;

        valet.name = name;
        valet.email = request.email;
        valet.phone = request.phone;
        if let Some(status) = request.status {
            valet.status = status;
        }
        valet.updated_at = Utc::now();

        self.store
            .update_valet(&valet)
            .await
            .map_err(|e| not_found(e, SchedulingError::ValetNotFound(*valet_id)))?;

        tracing::info!(valet_id = %valet_id, "Updated valet");

        Ok(valet)
    }

    async fn delete_valet(&self, valet_id: &ValetId) -> Result<()> {
        self.store
            .delete_valet(valet_id)
            .await
            .map_err(|e| not_found(e, SchedulingError::ValetNotFound(*valet_id)))?;

        tracing::info!(valet_id = %valet_id, "Deleted valet");

        Ok(())
    }

    // =========================================================================
    // Holidays
    // =========================================================================

    async fn list_holidays(&self, valet_id: &ValetId) -> Result<Vec<NaiveDate>> {
        self.require_valet(valet_id).await?;
        Ok(self.store.list_holidays(valet_id).await?)
    }

    async fn add_holiday(&self, valet_id: &ValetId, date: NaiveDate) -> Result<()> {
        self.require_valet(valet_id).await?;
        self.store.add_holiday(valet_id, date).await?;

        tracing::info!(valet_id = %valet_id, date = %date, "Added holiday");

        Ok(())
    }

    async fn remove_holiday(&self, valet_id: &ValetId, date: NaiveDate) -> Result<()> {
        self.store
            .remove_holiday(valet_id, date)
            .await
            .map_err(|e| {
                not_found(
                    e,
                    SchedulingError::HolidayNotFound {
                        valet_id: *valet_id,
                        date,
                    },
                )
            })?;

        tracing::info!(valet_id = %valet_id, date = %date, "Removed holiday");

        Ok(())
    }

    // =========================================================================
    // Availability
    // =========================================================================

    async fn batch_availability(
        &self,
        valet_id: &ValetId,
        dates: &[NaiveDate],
    ) -> Result<BatchAvailability> {
        if dates.len() > self.config.max_batch_dates {
            return Err(SchedulingError::Validation(format!(
                "At most {} dates may be requested at once",
                self.config.max_batch_dates
            )));
        }

        let settings = self.require_settings().await?;
        self.require_valet(valet_id).await?;

        let Some(rota) = self.store.get_active_rota(valet_id).await? else {
            tracing::debug!(valet_id = %valet_id, "No active rota");
            return Ok(BatchAvailability::NoActiveRota);
        };

        let counts = self.store.booking_counts(valet_id, dates).await?;
        let holidays = self.store.holidays_among(valet_id, dates).await?;

        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };
        let result = availability::compute_availability(&inputs, dates, Utc::now().date_naive());

        tracing::debug!(valet_id = %valet_id, dates = dates.len(), "Computed batch availability");

        Ok(result)
    }

    async fn slot_detail(&self, valet_id: &ValetId, date: NaiveDate) -> Result<DayOutcome> {
        let settings = self.require_settings().await?;
        self.require_valet(valet_id).await?;

        let Some(rota) = self.store.get_active_rota(valet_id).await? else {
            return Ok(DayOutcome::Closed(ClosedReason::NoActiveRota));
        };

        let dates = [date];
        let counts = self.store.booking_counts(valet_id, &dates).await?;
        let holidays = self.store.holidays_among(valet_id, &dates).await?;
        let day_bookings = self.store.count_open_bookings(valet_id, date).await?;

        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };
        let outcome = availability::slot_detail(&inputs, date, day_bookings, Utc::now());

        tracing::debug!(valet_id = %valet_id, date = %date, "Computed slot detail");

        Ok(outcome)
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    async fn list_bookings(&self, query: &BookingListQuery) -> Result<Vec<Booking>> {
        let filter = query.to_filter(self.config.booking_list_limit)?;
        Ok(self.store.list_bookings(&filter).await?)
    }

    async fn bookings_by_date(&self) -> Result<Vec<Booking>> {
        Ok(self.store.list_uncompleted_bookings().await?)
    }

    async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking> {
        let mut booking = request.into_booking(Utc::now())?;
        let valet_id = booking.valet_id;
        let date = booking.booking_date;

        let rota = self
            .store
            .get_active_rota(&valet_id)
            .await?
            .ok_or(SchedulingError::NoActiveRota(valet_id))?;

        let current = self.store.count_open_bookings(&valet_id, date).await?;
        let check = capacity::check_capacity(&rota, date, current);
        if !check.accepted {
            tracing::info!(
                valet_id = %valet_id,
                date = %date,
                max_capacity = check.max_capacity,
                current_bookings = check.current_count,
                "Booking rejected: valet at capacity"
            );
            return Err(SchedulingError::CapacityExceeded {
                valet_id,
                date,
                max_capacity: check.max_capacity,
                current_bookings: check.current_count,
            });
        }

        if booking.valet_name.is_none() {
            booking.valet_name = self.store.get_valet(&valet_id).await?.map(|v| v.name);
        }

        let inserted = self
            .store
            .insert_booking_within_capacity(&booking, check.max_capacity)
            .await?;
        if !inserted {
            // A concurrent booking took the last place after the check above.
            let current_bookings = self.store.count_open_bookings(&valet_id, date).await?;
            tracing::info!(
                valet_id = %valet_id,
                date = %date,
                max_capacity = check.max_capacity,
                current_bookings,
                "Booking rejected: capacity taken concurrently"
            );
            return Err(SchedulingError::CapacityExceeded {
                valet_id,
                date,
                max_capacity: check.max_capacity,
                current_bookings,
            });
        }

        tracing::info!(
            booking_id = %booking.booking_id,
            booking_code = %booking.booking_code,
            valet_id = %valet_id,
            date = %date,
            "Created booking"
        );

        Ok(booking)
    }

    async fn complete_booking(&self, booking_id: &BookingId) -> Result<Booking> {
        let booking = self
            .store
            .complete_booking(booking_id)
            .await
            .map_err(|e| not_found(e, SchedulingError::BookingNotFound(*booking_id)))?;

        tracing::info!(booking_id = %booking_id, "Completed booking");

        Ok(booking)
    }

    async fn delete_booking(&self, booking_id: &BookingId) -> Result<()> {
        self.store
            .delete_booking(booking_id)
            .await
            .map_err(|e| not_found(e, SchedulingError::BookingNotFound(*booking_id)))?;

        tracing::info!(booking_id = %booking_id, "Deleted booking");

        Ok(())
    }
}

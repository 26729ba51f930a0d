//! Request and response types for scheduling operations.
//!
//! Requests arrive loosely typed from the HTTP layer and are validated here
//! into the store's domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use valet_core::{parse_date, BookingId, RotaId, SlotTime, ValetId};
use valet_store::{
    Booking, BookingFilter, BookingStatus, DaySchedule, HealthCounts, SlotSettings, ValetStatus,
    WeekSchedule,
};

use crate::error::{Result, SchedulingError};

/// Longest accepted same-day notice, one year.
pub const MAX_LEAD_TIME_HOURS: u32 = 24 * 365;

fn invalid(message: impl Into<String>) -> SchedulingError {
    SchedulingError::Validation(message.into())
}

/// Treat empty or whitespace-only strings as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_time_field(field: &str, value: &str) -> Result<SlotTime> {
    SlotTime::parse(value).map_err(|_| invalid(format!("Invalid {field}: {value}")))
}

/// Parse a `YYYY-MM-DD` date supplied by a client.
///
/// # Errors
///
/// Returns `SchedulingError::Validation` for any other shape.
pub fn parse_request_date(value: &str) -> Result<NaiveDate> {
    parse_date(value).map_err(|_| invalid(format!("Invalid date format: {value}")))
}

/// Request to replace the slot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSettingsRequest {
    /// First slot start, `HH:MM`.
    pub slot_start_time: String,
    /// End of the slot window, `HH:MM`.
    pub slot_end_time: String,
    /// Step between slot starts.
    pub slot_duration_minutes: u16,
    /// Start of the break window, `HH:MM`.
    pub break_start_time: String,
    /// End of the break window, `HH:MM`.
    pub break_end_time: String,
    /// Minimum notice for same-day bookings.
    pub lead_time_hours: u32,
    /// Who is making the change.
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl SlotSettingsRequest {
    /// Validate into settings.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` if a time is malformed, the window
    /// is empty, the break is inverted, the duration is zero, or the lead time
    /// exceeds [`MAX_LEAD_TIME_HOURS`].
    pub fn validate(&self) -> Result<SlotSettings> {
        let settings = SlotSettings {
            slot_start_time: parse_time_field("slot_start_time", &self.slot_start_time)?,
            slot_end_time: parse_time_field("slot_end_time", &self.slot_end_time)?,
            slot_duration_minutes: self.slot_duration_minutes,
            break_start_time: parse_time_field("break_start_time", &self.break_start_time)?,
            break_end_time: parse_time_field("break_end_time", &self.break_end_time)?,
            lead_time_hours: self.lead_time_hours,
        };

        if settings.slot_duration_minutes == 0 {
            return Err(invalid("slot_duration_minutes must be positive"));
        }
        if settings.slot_start_time >= settings.slot_end_time {
            return Err(invalid("slot_start_time must be before slot_end_time"));
        }
        if settings.break_start_time > settings.break_end_time {
            return Err(invalid("break_start_time must not be after break_end_time"));
        }
        if settings.lead_time_hours > MAX_LEAD_TIME_HOURS {
            return Err(invalid(format!(
                "lead_time_hours must be at most {MAX_LEAD_TIME_HOURS}"
            )));
        }
        Ok(settings)
    }
}

/// Request to create or update a valet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValetRequest {
    /// Display name. Required.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Employment status. New valets default to active; updates keep the
    /// current status when omitted.
    #[serde(default)]
    pub status: Option<ValetStatus>,
}

impl ValetRequest {
    /// Create a request with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The trimmed name.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` if the name is blank.
    pub fn validated_name(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("Name is required"));
        }
        Ok(name.to_string())
    }
}

/// Request to replace one rota's weekly schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct RotaUpdateRequest {
    /// The rota to update. Required.
    pub rota_id: Option<RotaId>,
    pub sunday_available: bool,
    pub sunday_capacity: Option<u32>,
    pub monday_available: bool,
    pub monday_capacity: Option<u32>,
    pub tuesday_available: bool,
    pub tuesday_capacity: Option<u32>,
    pub wednesday_available: bool,
    pub wednesday_capacity: Option<u32>,
    pub thursday_available: bool,
    pub thursday_capacity: Option<u32>,
    pub friday_available: bool,
    pub friday_capacity: Option<u32>,
    pub saturday_available: bool,
    pub saturday_capacity: Option<u32>,
    /// Who is making the change.
    pub updated_by: Option<String>,
}

impl RotaUpdateRequest {
    /// The target rota.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` if no rota ID was given.
    pub fn rota_id(&self) -> Result<RotaId> {
        self.rota_id.ok_or_else(|| invalid("Rota ID is required"))
    }

    /// The seven day schedules carried by the request.
    #[must_use]
    pub fn schedule(&self) -> WeekSchedule {
        let day = |available, capacity| DaySchedule {
            available,
            capacity,
        };
        WeekSchedule::new([
            day(self.sunday_available, self.sunday_capacity),
            day(self.monday_available, self.monday_capacity),
            day(self.tuesday_available, self.tuesday_capacity),
            day(self.wednesday_available, self.wednesday_capacity),
            day(self.thursday_available, self.thursday_capacity),
            day(self.friday_available, self.friday_capacity),
            day(self.saturday_available, self.saturday_capacity),
        ])
    }
}

/// Request for availability across several dates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityBatchRequest {
    /// The valet.
    #[serde(default)]
    pub valet_id: Option<ValetId>,
    /// Dates as `YYYY-MM-DD`.
    #[serde(default)]
    pub dates: Option<Vec<String>>,
}

impl AvailabilityBatchRequest {
    /// Validate into a valet and parsed dates.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` if a field is missing or a date
    /// is malformed.
    pub fn validate(&self) -> Result<(ValetId, Vec<NaiveDate>)> {
        let (Some(valet_id), Some(dates)) = (self.valet_id, self.dates.as_ref()) else {
            return Err(invalid("valet_id and dates array required"));
        };
        let dates = dates
            .iter()
            .map(|d| parse_request_date(d))
            .collect::<Result<Vec<_>>>()?;
        Ok((valet_id, dates))
    }
}

/// Request to mark a valet as off on a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayRequest {
    /// The date, `YYYY-MM-DD`.
    #[serde(alias = "date")]
    pub holiday_date: String,
}

/// Request to create a booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct CreateBookingRequest {
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_registration: Option<String>,
    pub vehicle_colour: Option<String>,
    /// `new` or `used`; defaults to `used`.
    pub vehicle_condition: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    /// `YYYY-MM-DD`.
    pub booking_date: Option<String>,
    /// Slot start, `HH:MM`.
    pub booking_time: Option<String>,
    pub valet_id: Option<String>,
    /// Defaults to the valet's current name.
    pub valet_name: Option<String>,
    pub key_number: Option<String>,
    pub sales_executive_name: Option<String>,
    /// Defaults to `no`.
    pub paint_protection: Option<String>,
    pub special_requirements: Option<String>,
    pub notes: Option<String>,
    /// Defaults to `manual`.
    pub source: Option<String>,
    pub prep_tracker_id: Option<String>,
}

impl CreateBookingRequest {
    /// Validate and build a new pending booking stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` if a required field is missing or
    /// the date, time, or valet ID is malformed.
    pub fn into_booking(self, now: DateTime<Utc>) -> Result<Booking> {
        let (Some(vehicle_make), Some(vehicle_model), Some(booking_date), Some(valet_id)) = (
            non_blank(self.vehicle_make),
            non_blank(self.vehicle_model),
            non_blank(self.booking_date),
            non_blank(self.valet_id),
        ) else {
            return Err(invalid("Missing required fields"));
        };

        let valet_id: ValetId = valet_id
            .parse()
            .map_err(|_| invalid(format!("Invalid valet_id: {valet_id}")))?;
        let booking_date = parse_request_date(&booking_date)?;
        let booking_time = non_blank(self.booking_time)
            .map(|t| parse_time_field("booking_time", &t))
            .transpose()?;

        Ok(Booking {
            booking_id: BookingId::generate(),
            booking_code: format!("VB-{}", now.timestamp_millis()),
            vehicle_make,
            vehicle_model,
            vehicle_registration: non_blank(self.vehicle_registration),
            vehicle_colour: non_blank(self.vehicle_colour),
            vehicle_condition: non_blank(self.vehicle_condition)
                .unwrap_or_else(|| "used".to_string()),
            customer_name: non_blank(self.customer_name),
            customer_email: non_blank(self.customer_email),
            customer_phone: non_blank(self.customer_phone),
            booking_date,
            booking_time,
            valet_id,
            valet_name: non_blank(self.valet_name),
            status: BookingStatus::Pending,
            paint_protection: non_blank(self.paint_protection).unwrap_or_else(|| "no".to_string()),
            special_requirements: non_blank(self.special_requirements),
            notes: non_blank(self.notes),
            key_number: non_blank(self.key_number),
            sales_executive_name: non_blank(self.sales_executive_name),
            source: non_blank(self.source).unwrap_or_else(|| "manual".to_string()),
            prep_tracker_id: non_blank(self.prep_tracker_id),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Query parameters for listing bookings. `all` or empty disables a filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingListQuery {
    /// Booking status to match.
    pub filter_status: Option<String>,
    /// Booking source to match.
    pub filter_source: Option<String>,
    /// Substring of the booking code or customer name.
    pub search_term: Option<String>,
}

impl BookingListQuery {
    /// Convert into a store filter returning at most `limit` rows.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Validation` for an unknown status.
    pub fn to_filter(&self, limit: u32) -> Result<BookingFilter> {
        let active = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty() && *v != "all")
                .map(str::to_string)
        };

        let status = active(&self.filter_status)
            .map(|s| {
                BookingStatus::parse(&s).ok_or_else(|| invalid(format!("Unknown status: {s}")))
            })
            .transpose()?;

        Ok(BookingFilter {
            status,
            source: active(&self.filter_source),
            search: self
                .search_term
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            limit,
        })
    }
}

/// Readiness of the service's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Settings, at least one active valet, and at least one active rota exist.
    pub ready: bool,
    /// The underlying row counts.
    pub counts: HealthCounts,
}

impl From<HealthCounts> for HealthReport {
    fn from(counts: HealthCounts) -> Self {
        Self {
            ready: counts.slot_settings > 0 && counts.active_valets > 0 && counts.active_rotas > 0,
            counts,
        }
    }
}

/// Configuration for the scheduling service.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Maximum rows returned by a booking list.
    pub booking_list_limit: u32,
    /// Maximum dates accepted by one batch availability request.
    pub max_batch_dates: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            booking_list_limit: 100,
            max_batch_dates: 366,
        }
    }
}

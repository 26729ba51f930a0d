//! Domain types stored in the database.
//!
//! These types represent the persisted state of slot settings, valets, rotas,
//! bookings, and holidays.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use valet_core::{BookingId, RotaId, SlotTime, ValetId, Weekday};

/// Capacity used when a rota day has no capacity set (or zero).
pub const DEFAULT_DAILY_CAPACITY: u32 = 3;

/// The global slot template, stored as a singleton row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSettings {
    /// First slot start of the day.
    pub slot_start_time: SlotTime,
    /// Slots start strictly before this time.
    pub slot_end_time: SlotTime,
    /// Step between slot starts.
    pub slot_duration_minutes: u16,
    /// Slot starts in `[break_start_time, break_end_time)` are skipped.
    pub break_start_time: SlotTime,
    /// End of the break window (exclusive). Equal to the start means no break.
    pub break_end_time: SlotTime,
    /// Minimum notice, in hours, before a same-day slot can be booked.
    pub lead_time_hours: u32,
}

/// Whether a valet works on a given weekday, and how many bookings they take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DaySchedule {
    /// The valet works on this day.
    pub available: bool,
    /// Configured capacity. `None` or zero falls back to the default.
    pub capacity: Option<u32>,
}

impl DaySchedule {
    /// Capacity after applying the default for unset or zero values.
    #[must_use]
    pub fn effective_capacity(&self) -> u32 {
        match self.capacity {
            Some(capacity) if capacity > 0 => capacity,
            _ => DEFAULT_DAILY_CAPACITY,
        }
    }
}

/// Seven day schedules indexed by [`Weekday`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekSchedule([DaySchedule; 7]);

impl WeekSchedule {
    /// Build from per-day schedules in [`Weekday::ALL`] order.
    #[must_use]
    pub const fn new(days: [DaySchedule; 7]) -> Self {
        Self(days)
    }

    /// The schedule applied to newly created valets: Monday to Friday on,
    /// weekends off, default capacity.
    #[must_use]
    pub fn weekdays_only() -> Self {
        let mut week = Self::default();
        for day in [
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
        ] {
            week.set(
                day,
                DaySchedule {
                    available: true,
                    capacity: None,
                },
            );
        }
        week
    }

    /// Schedule for a weekday.
    #[must_use]
    pub const fn day(&self, weekday: Weekday) -> DaySchedule {
        self.0[weekday.index()]
    }

    /// Replace the schedule for a weekday.
    pub fn set(&mut self, weekday: Weekday, schedule: DaySchedule) {
        self.0[weekday.index()] = schedule;
    }

    /// Iterate `(weekday, schedule)` pairs, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, DaySchedule)> + '_ {
        Weekday::ALL.iter().map(|day| (*day, self.day(*day)))
    }
}

/// A valet's weekly rota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rota {
    /// Unique identifier for the rota row.
    pub rota_id: RotaId,
    /// The valet this rota belongs to.
    pub valet_id: ValetId,
    /// Per-weekday availability and capacity.
    pub days: WeekSchedule,
    /// Only the active rota is used for scheduling.
    pub is_active: bool,
    /// Who last changed the rota.
    pub updated_by: Option<String>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Rota {
    /// Schedule for the weekday of `date`.
    #[must_use]
    pub fn day_for(&self, date: NaiveDate) -> DaySchedule {
        self.days.day(Weekday::of(date))
    }
}

/// An active rota together with its valet's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotaSummary {
    /// The rota.
    pub rota: Rota,
    /// Name of the valet, if the valet row still exists.
    pub valet_name: Option<String>,
}

/// Employment status of a valet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValetStatus {
    /// Taking bookings.
    #[default]
    Active,
    /// Not currently working.
    Inactive,
}

impl ValetStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parse the database representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// A valet record stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valet {
    /// Unique identifier for the valet.
    pub valet_id: ValetId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Employment status.
    pub status: ValetStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Newly created.
    Pending,
    /// Acknowledged by staff.
    Confirmed,
    /// Service done.
    Completed,
    /// Called off.
    Cancelled,
}

impl BookingStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the database representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A booking record stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier for the booking.
    pub booking_id: BookingId,
    /// Human-readable reference, `VB-<millis>`.
    pub booking_code: String,
    /// Vehicle manufacturer.
    pub vehicle_make: String,
    /// Vehicle model.
    pub vehicle_model: String,
    /// Registration plate.
    pub vehicle_registration: Option<String>,
    /// Paint colour.
    pub vehicle_colour: Option<String>,
    /// `new` or `used`.
    pub vehicle_condition: String,
    /// Customer's name.
    pub customer_name: Option<String>,
    /// Customer's email.
    pub customer_email: Option<String>,
    /// Customer's phone number.
    pub customer_phone: Option<String>,
    /// Service date.
    pub booking_date: NaiveDate,
    /// Slot start, if the booking is tied to a slot.
    pub booking_time: Option<SlotTime>,
    /// Assigned valet.
    pub valet_id: ValetId,
    /// Denormalized valet name at booking time.
    pub valet_name: Option<String>,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Paint protection option (`no` by default).
    pub paint_protection: String,
    /// Free-text requirements.
    pub special_requirements: Option<String>,
    /// Internal notes.
    pub notes: Option<String>,
    /// Key tag number.
    pub key_number: Option<String>,
    /// Sales executive responsible for the vehicle.
    pub sales_executive_name: Option<String>,
    /// Where the booking came from (`manual` by default).
    pub source: String,
    /// Link to an external prep tracker entry.
    pub prep_tracker_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Filters for listing bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Only bookings with this status.
    pub status: Option<BookingStatus>,
    /// Only bookings from this source.
    pub source: Option<String>,
    /// Case-insensitive substring of the booking code or customer name.
    pub search: Option<String>,
    /// Maximum number of rows.
    pub limit: u32,
}

/// Open (non-terminal) booking counts keyed by date and slot time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingCounts(HashMap<(NaiveDate, SlotTime), u32>);

impl BookingCounts {
    /// An empty set of counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` bookings at `(date, time)`.
    pub fn record(&mut self, date: NaiveDate, time: SlotTime, count: u32) {
        *self.0.entry((date, time)).or_insert(0) += count;
    }

    /// Number of open bookings at `(date, time)`.
    #[must_use]
    pub fn get(&self, date: NaiveDate, time: SlotTime) -> u32 {
        self.0.get(&(date, time)).copied().unwrap_or(0)
    }
}

impl FromIterator<(NaiveDate, SlotTime, u32)> for BookingCounts {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, SlotTime, u32)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (date, time, count) in iter {
            counts.record(date, time, count);
        }
        counts
    }
}

/// Row counts reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthCounts {
    /// Rows in the slot settings table.
    pub slot_settings: u64,
    /// Valets with `active` status.
    pub active_valets: u64,
    /// Rotas flagged active.
    pub active_rotas: u64,
}

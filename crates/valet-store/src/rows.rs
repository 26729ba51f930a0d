//! Row shapes read from SQLite and their conversion into domain types.
//!
//! Columns are read as primitive SQL values and validated here, so a bad value
//! in the database surfaces as `StoreError::Corrupt` instead of a panic.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use valet_core::{parse_date, SlotTime};

use crate::error::{Result, StoreError};
use crate::types::{
    Booking, BookingStatus, DaySchedule, Rota, SlotSettings, Valet, ValetStatus, WeekSchedule,
};

fn corrupt(what: &str, value: impl Display) -> StoreError {
    StoreError::Corrupt(format!("{what}: {value}"))
}

pub(crate) fn parse_id<T: FromStr>(what: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| corrupt(what, value))
}

pub(crate) fn parse_time(what: &str, value: &str) -> Result<SlotTime> {
    SlotTime::parse(value).map_err(|_| corrupt(what, value))
}

pub(crate) fn parse_day(what: &str, value: &str) -> Result<NaiveDate> {
    parse_date(value).map_err(|_| corrupt(what, value))
}

pub(crate) fn parse_timestamp(what: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| corrupt(what, value))
}

pub(crate) fn to_u32(what: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| corrupt(what, value))
}

#[derive(Debug, FromRow)]
pub(crate) struct SettingsRow {
    slot_start_time: String,
    slot_end_time: String,
    slot_duration_minutes: i64,
    break_start_time: String,
    break_end_time: String,
    lead_time_hours: i64,
}

impl TryFrom<SettingsRow> for SlotSettings {
    type Error = StoreError;

    fn try_from(row: SettingsRow) -> Result<Self> {
        Ok(Self {
            slot_start_time: parse_time("slot_start_time", &row.slot_start_time)?,
            slot_end_time: parse_time("slot_end_time", &row.slot_end_time)?,
            slot_duration_minutes: u16::try_from(row.slot_duration_minutes)
                .map_err(|_| corrupt("slot_duration_minutes", row.slot_duration_minutes))?,
            break_start_time: parse_time("break_start_time", &row.break_start_time)?,
            break_end_time: parse_time("break_end_time", &row.break_end_time)?,
            lead_time_hours: to_u32("lead_time_hours", row.lead_time_hours)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ValetRow {
    valet_id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ValetRow> for Valet {
    type Error = StoreError;

    fn try_from(row: ValetRow) -> Result<Self> {
        Ok(Self {
            valet_id: parse_id("valet_id", &row.valet_id)?,
            name: row.name,
            email: row.email,
            phone: row.phone,
            status: ValetStatus::parse(&row.status).ok_or_else(|| corrupt("status", &row.status))?,
            created_at: parse_timestamp("created_at", &row.created_at)?,
            updated_at: parse_timestamp("updated_at", &row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RotaRow {
    rota_id: String,
    valet_id: String,
    sunday_available: bool,
    sunday_capacity: Option<i64>,
    monday_available: bool,
    monday_capacity: Option<i64>,
    tuesday_available: bool,
    tuesday_capacity: Option<i64>,
    wednesday_available: bool,
    wednesday_capacity: Option<i64>,
    thursday_available: bool,
    thursday_capacity: Option<i64>,
    friday_available: bool,
    friday_capacity: Option<i64>,
    saturday_available: bool,
    saturday_capacity: Option<i64>,
    is_active: bool,
    updated_by: Option<String>,
    updated_at: String,
    pub(crate) valet_name: Option<String>,
}

fn day(available: bool, capacity: Option<i64>) -> Result<DaySchedule> {
    Ok(DaySchedule {
        available,
        capacity: capacity.map(|c| to_u32("capacity", c)).transpose()?,
    })
}

impl TryFrom<RotaRow> for Rota {
    type Error = StoreError;

    fn try_from(row: RotaRow) -> Result<Self> {
        let days = WeekSchedule::new([
            day(row.sunday_available, row.sunday_capacity)?,
            day(row.monday_available, row.monday_capacity)?,
            day(row.tuesday_available, row.tuesday_capacity)?,
            day(row.wednesday_available, row.wednesday_capacity)?,
            day(row.thursday_available, row.thursday_capacity)?,
            day(row.friday_available, row.friday_capacity)?,
            day(row.saturday_available, row.saturday_capacity)?,
        ]);

        Ok(Self {
            rota_id: parse_id("rota_id", &row.rota_id)?,
            valet_id: parse_id("valet_id", &row.valet_id)?,
            days,
            is_active: row.is_active,
            updated_by: row.updated_by,
            updated_at: parse_timestamp("updated_at", &row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct BookingRow {
    booking_id: String,
    booking_code: String,
    vehicle_make: String,
    vehicle_model: String,
    vehicle_registration: Option<String>,
    vehicle_colour: Option<String>,
    vehicle_condition: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    booking_date: String,
    booking_time: Option<String>,
    valet_id: String,
    valet_name: Option<String>,
    status: String,
    paint_protection: String,
    special_requirements: Option<String>,
    notes: Option<String>,
    key_number: Option<String>,
    sales_executive_name: Option<String>,
    source: String,
    prep_tracker_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self> {
        Ok(Self {
            booking_id: parse_id("booking_id", &row.booking_id)?,
            booking_code: row.booking_code,
            vehicle_make: row.vehicle_make,
            vehicle_model: row.vehicle_model,
            vehicle_registration: row.vehicle_registration,
            vehicle_colour: row.vehicle_colour,
            vehicle_condition: row.vehicle_condition,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            booking_date: parse_day("booking_date", &row.booking_date)?,
            booking_time: row
                .booking_time
                .as_deref()
                .map(|t| parse_time("booking_time", t))
                .transpose()?,
            valet_id: parse_id("valet_id", &row.valet_id)?,
            valet_name: row.valet_name,
            status: BookingStatus::parse(&row.status)
                .ok_or_else(|| corrupt("status", &row.status))?,
            paint_protection: row.paint_protection,
            special_requirements: row.special_requirements,
            notes: row.notes,
            key_number: row.key_number,
            sales_executive_name: row.sales_executive_name,
            source: row.source,
            prep_tracker_id: row.prep_tracker_id,
            created_at: parse_timestamp("created_at", &row.created_at)?,
            updated_at: parse_timestamp("updated_at", &row.updated_at)?,
        })
    }
}

//! Slot availability computation.
//!
//! Everything here is pure: inputs are fetched by the service beforehand and
//! the current instant is passed in, so identical inputs always produce
//! identical results.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use valet_core::{SlotTime, Weekday};
use valet_store::{BookingCounts, DaySchedule, Rota, SlotSettings};

/// Everything the engine reads for one valet.
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    /// The global slot template.
    pub settings: &'a SlotSettings,
    /// The valet's active rota, if any.
    pub rota: Option<&'a Rota>,
    /// Open bookings per `(date, slot time)`.
    pub counts: &'a BookingCounts,
    /// The valet's holidays among the requested dates.
    pub holidays: &'a HashSet<NaiveDate>,
}

/// Slot totals for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    /// Slots with spare capacity.
    pub available: u32,
    /// All slots generated for the day.
    pub total: u32,
}

/// Result of a multi-date availability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAvailability {
    /// The valet has no active rota; no dates were evaluated.
    NoActiveRota,
    /// Totals per requested date.
    Dates(BTreeMap<NaiveDate, DayAvailability>),
}

/// Why a day offers no slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedReason {
    /// The valet has no active rota.
    NoActiveRota,
    /// The rota marks this weekday as off.
    NotWorking(Weekday),
    /// The valet is on holiday.
    Holiday,
    /// The date is before today.
    Past,
}

impl fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveRota => f.write_str("No active rota"),
            Self::NotWorking(day) => write!(f, "Not available on {day}"),
            Self::Holiday => f.write_str("Holiday"),
            Self::Past => f.write_str("Date is in the past"),
        }
    }
}

/// One open slot in the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    /// Slot start.
    pub time: SlotTime,
    /// The slot has spare capacity.
    pub available: bool,
    /// Open bookings already in the slot.
    pub booked_count: u32,
    /// Bookings the slot can hold.
    pub capacity: u32,
    /// The slot can still be booked given the lead time.
    pub can_book: bool,
}

/// Detail view of a working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotDetail {
    /// Weekday of the date.
    pub day_of_week: Weekday,
    /// The rota marks this weekday as worked.
    pub is_available_today: bool,
    /// The valet's capacity for the day.
    pub max_slots_per_day: u32,
    /// Number of generated slots, full or not.
    pub total_slots_available: u32,
    /// Number of slots with spare capacity.
    pub available_slots: u32,
    /// Bookings the valet can still take that day.
    pub bookable_slots: u32,
    /// Minimum notice for same-day bookings.
    pub lead_time_hours: u32,
    /// The slots with spare capacity, in time order.
    pub slots: Vec<SlotInfo>,
}

/// Result of a single-date detail query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    /// No slots are offered.
    Closed(ClosedReason),
    /// The valet works this day.
    Open(SlotDetail),
}

/// Slot start times for a day: `start` up to (not including) `end`, stepping
/// by the slot duration and skipping starts inside `[break_start, break_end)`.
pub fn slot_starts(settings: &SlotSettings) -> impl Iterator<Item = SlotTime> {
    let start = settings.slot_start_time.minutes();
    let end = if settings.slot_duration_minutes == 0 {
        start
    } else {
        settings.slot_end_time.minutes()
    };
    let step = usize::from(settings.slot_duration_minutes.max(1));
    let break_window = settings.break_start_time.minutes()..settings.break_end_time.minutes();

    (start..end)
        .step_by(step)
        .filter(move |minute| !break_window.contains(minute))
        .filter_map(SlotTime::from_minutes)
}

fn open_day(
    inputs: &Inputs<'_>,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<DaySchedule, ClosedReason> {
    let rota = inputs.rota.ok_or(ClosedReason::NoActiveRota)?;
    if date < today {
        return Err(ClosedReason::Past);
    }
    let weekday = Weekday::of(date);
    let day = rota.days.day(weekday);
    if !day.available {
        return Err(ClosedReason::NotWorking(weekday));
    }
    if inputs.holidays.contains(&date) {
        return Err(ClosedReason::Holiday);
    }
    Ok(day)
}

/// Slot totals for one date. Closed days are `{0, 0}`.
#[must_use]
pub fn day_availability(
    inputs: &Inputs<'_>,
    date: NaiveDate,
    today: NaiveDate,
) -> DayAvailability {
    let Ok(day) = open_day(inputs, date, today) else {
        return DayAvailability::default();
    };
    let capacity = day.effective_capacity();

    let mut result = DayAvailability::default();
    for time in slot_starts(inputs.settings) {
        result.total += 1;
        if inputs.counts.get(date, time) < capacity {
            result.available += 1;
        }
    }
    result
}

/// Slot totals for every requested date.
#[must_use]
pub fn compute_availability(
    inputs: &Inputs<'_>,
    dates: &[NaiveDate],
    today: NaiveDate,
) -> BatchAvailability {
    if inputs.rota.is_none() {
        return BatchAvailability::NoActiveRota;
    }

    BatchAvailability::Dates(
        dates
            .iter()
            .map(|date| (*date, day_availability(inputs, *date, today)))
            .collect(),
    )
}

/// Per-slot detail for one date.
///
/// `day_bookings` is the valet's open booking count for the whole day,
/// including bookings without a slot time.
#[must_use]
pub fn slot_detail(
    inputs: &Inputs<'_>,
    date: NaiveDate,
    day_bookings: u32,
    now: DateTime<Utc>,
) -> DayOutcome {
    let day = match open_day(inputs, date, now.date_naive()) {
        Ok(day) => day,
        Err(reason) => return DayOutcome::Closed(reason),
    };
    let capacity = day.effective_capacity();
    let lead_time_hours = inputs.settings.lead_time_hours;
    // Past the representable range nothing is bookable today.
    let earliest = now.checked_add_signed(Duration::hours(i64::from(lead_time_hours)));
    let is_today = date == now.date_naive();

    let mut totals = DayAvailability::default();
    let mut slots = Vec::new();
    for time in slot_starts(inputs.settings) {
        totals.total += 1;
        let booked_count = inputs.counts.get(date, time);
        if booked_count >= capacity {
            continue;
        }
        totals.available += 1;
        let can_book = if is_today {
            let start = Utc.from_utc_datetime(&date.and_time(time.to_naive_time()));
            earliest.is_some_and(|earliest| start > earliest)
        } else {
            true
        };
        slots.push(SlotInfo {
            time,
            available: true,
            booked_count,
            capacity,
            can_book,
        });
    }

    DayOutcome::Open(SlotDetail {
        day_of_week: Weekday::of(date),
        is_available_today: day.available,
        max_slots_per_day: capacity,
        total_slots_available: totals.total,
        available_slots: totals.available,
        bookable_slots: capacity.saturating_sub(day_bookings),
        lead_time_hours,
        slots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::{RotaId, ValetId};
    use valet_store::WeekSchedule;

    fn date(s: &str) -> NaiveDate {
        valet_core::parse_date(s).unwrap()
    }

    fn time(s: &str) -> SlotTime {
        SlotTime::parse(s).unwrap()
    }

    fn settings() -> SlotSettings {
        SlotSettings {
            slot_start_time: time("09:00"),
            slot_end_time: time("17:00"),
            slot_duration_minutes: 30,
            break_start_time: time("12:00"),
            break_end_time: time("13:00"),
            lead_time_hours: 2,
        }
    }

    fn rota(monday_capacity: Option<u32>) -> Rota {
        let mut days = WeekSchedule::weekdays_only();
        days.set(
            Weekday::Monday,
            DaySchedule {
                available: true,
                capacity: monday_capacity,
            },
        );
        Rota {
            rota_id: RotaId::generate(),
            valet_id: ValetId::generate(),
            days,
            is_active: true,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }

    // 2024-06-10 is a Monday.
    const MONDAY: &str = "2024-06-10";
    const TODAY: &str = "2024-06-03";

    fn detail(outcome: DayOutcome) -> SlotDetail {
        match outcome {
            DayOutcome::Open(detail) => detail,
            DayOutcome::Closed(reason) => panic!("expected open day, got {reason}"),
        }
    }

    #[test]
    fn open_day_with_no_bookings() {
        let settings = settings();
        let rota = rota(Some(3));
        let counts = BookingCounts::new();
        let holidays = HashSet::new();
        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };

        let result = day_availability(&inputs, date(MONDAY), date(TODAY));
        assert_eq!(
            result,
            DayAvailability {
                available: 14,
                total: 14
            }
        );
    }

    #[test]
    fn full_slot_reduces_available() {
        let settings = settings();
        let rota = rota(Some(3));
        let mut counts = BookingCounts::new();
        counts.record(date(MONDAY), time("09:00"), 3);
        let holidays = HashSet::new();
        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };

        let result = day_availability(&inputs, date(MONDAY), date(TODAY));
        assert_eq!(
            result,
            DayAvailability {
                available: 13,
                total: 14
            }
        );
    }

    #[test]
    fn unset_and_zero_capacity_default_to_three() {
        let settings = settings();
        let mut counts = BookingCounts::new();
        counts.record(date(MONDAY), time("10:00"), 2);
        counts.record(date(MONDAY), time("11:00"), 3);
        let holidays = HashSet::new();

        for capacity in [None, Some(0)] {
            let rota = rota(capacity);
            let inputs = Inputs {
                settings: &settings,
                rota: Some(&rota),
                counts: &counts,
                holidays: &holidays,
            };
            let result = day_availability(&inputs, date(MONDAY), date(TODAY));
            assert_eq!(result.available, 13);
        }
    }

    #[test]
    fn yesterday_is_closed_and_today_is_open() {
        let settings = settings();
        let rota = rota(Some(3));
        let counts = BookingCounts::new();
        let holidays = HashSet::new();
        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };

        // Friday 2024-06-07 is a worked day, so only the date rule closes it.
        let today = date("2024-06-08");
        let yesterday = date("2024-06-07");
        assert_eq!(
            day_availability(&inputs, yesterday, today),
            DayAvailability::default()
        );

        let monday = date(MONDAY);
        assert_eq!(day_availability(&inputs, monday, monday).total, 14);
    }

    #[test]
    fn unavailable_weekday_and_holiday_are_closed() {
        let settings = settings();
        let rota = rota(Some(3));
        let counts = BookingCounts::new();
        let holidays = HashSet::from([date(MONDAY)]);
        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };

        let saturday = date("2024-06-15");
        assert_eq!(
            day_availability(&inputs, saturday, date(TODAY)),
            DayAvailability::default()
        );
        assert_eq!(
            day_availability(&inputs, date(MONDAY), date(TODAY)),
            DayAvailability::default()
        );
    }

    #[test]
    fn slot_count_without_break() {
        let mut settings = settings();
        settings.break_start_time = settings.break_end_time;
        settings.slot_duration_minutes = 45;

        // 480 minutes stepped by 45 gives starts at 0, 45, ..., 450.
        assert_eq!(slot_starts(&settings).count(), 11);

        settings.slot_duration_minutes = 60;
        let starts: Vec<_> = slot_starts(&settings).map(|t| t.to_string()).collect();
        assert_eq!(starts.first().map(String::as_str), Some("09:00"));
        assert_eq!(starts.last().map(String::as_str), Some("16:00"));
        assert_eq!(starts.len(), 8);
    }

    #[test]
    fn zero_duration_yields_no_slots() {
        let mut settings = settings();
        settings.slot_duration_minutes = 0;
        assert_eq!(slot_starts(&settings).count(), 0);
    }

    #[test]
    fn more_bookings_never_increase_available() {
        let settings = settings();
        let rota = rota(Some(2));
        let holidays = HashSet::new();
        let monday = date(MONDAY);

        let mut previous = u32::MAX;
        for booked in 0..5 {
            let mut counts = BookingCounts::new();
            counts.record(monday, time("09:30"), booked);
            let inputs = Inputs {
                settings: &settings,
                rota: Some(&rota),
                counts: &counts,
                holidays: &holidays,
            };
            let available = day_availability(&inputs, monday, date(TODAY)).available;
            assert!(available <= previous);
            previous = available;
        }
    }

    #[test]
    fn batch_is_idempotent_and_flags_missing_rota() {
        let settings = settings();
        let rota = rota(Some(3));
        let counts = BookingCounts::new();
        let holidays = HashSet::new();
        let dates = [date(MONDAY), date("2024-06-11"), date("2024-06-15")];

        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };
        let first = compute_availability(&inputs, &dates, date(TODAY));
        let second = compute_availability(&inputs, &dates, date(TODAY));
        assert_eq!(first, second);

        let BatchAvailability::Dates(map) = first else {
            panic!("expected dates");
        };
        assert_eq!(map.len(), 3);
        assert_eq!(map[&date("2024-06-15")], DayAvailability::default());

        let without_rota = Inputs {
            rota: None,
            ..inputs
        };
        assert_eq!(
            compute_availability(&without_rota, &dates, date(TODAY)),
            BatchAvailability::NoActiveRota
        );
    }

    #[test]
    fn batch_matches_detail() {
        let settings = settings();
        let rota = rota(Some(2));
        let mut counts = BookingCounts::new();
        counts.record(date(MONDAY), time("09:00"), 2);
        counts.record(date(MONDAY), time("14:30"), 1);
        let holidays = HashSet::new();
        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap();

        let batch = day_availability(&inputs, date(MONDAY), now.date_naive());
        let detail = detail(slot_detail(&inputs, date(MONDAY), 3, now));

        assert_eq!(batch.available, detail.available_slots);
        assert_eq!(batch.total, detail.total_slots_available);
        assert_eq!(detail.slots.len(), 13);
        assert!(detail.slots.iter().all(|s| s.available && s.can_book));
        assert!(!detail.slots.iter().any(|s| s.time == time("09:00")));
        assert_eq!(detail.max_slots_per_day, 2);
        assert_eq!(detail.bookable_slots, 0);
        assert_eq!(detail.day_of_week, Weekday::Monday);
    }

    #[test]
    fn same_day_lead_time_blocks_early_slots() {
        let settings = settings();
        let rota = rota(Some(3));
        let counts = BookingCounts::new();
        let holidays = HashSet::new();
        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };
        // 10:15 with a 2 hour lead time: only slots after 12:15 are bookable.
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 10, 15, 0).unwrap();

        let detail = detail(slot_detail(&inputs, date(MONDAY), 1, now));
        let bookable: Vec<_> = detail
            .slots
            .iter()
            .filter(|s| s.can_book)
            .map(|s| s.time.to_string())
            .collect();
        assert_eq!(bookable.first().map(String::as_str), Some("13:00"));
        assert!(detail.slots.iter().any(|s| s.time == time("09:00") && !s.can_book));
        assert_eq!(detail.bookable_slots, 2);
    }

    #[test]
    fn detail_closed_reasons() {
        let settings = settings();
        let rota = rota(Some(3));
        let counts = BookingCounts::new();
        let holidays = HashSet::from([date("2024-06-11")]);
        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();

        fn closed(inputs: &Inputs<'_>, on: NaiveDate, now: DateTime<Utc>) -> String {
            match slot_detail(inputs, on, 0, now) {
                DayOutcome::Closed(reason) => reason.to_string(),
                DayOutcome::Open(_) => panic!("expected closed day"),
            }
        }

        assert_eq!(
            closed(&inputs, date("2024-06-15"), now),
            "Not available on saturday"
        );
        assert_eq!(closed(&inputs, date("2024-06-11"), now), "Holiday");
        assert_eq!(
            closed(&inputs, date("2024-06-07"), now),
            "Date is in the past"
        );

        let without_rota = Inputs {
            rota: None,
            ..inputs
        };
        assert_eq!(closed(&without_rota, date(MONDAY), now), "No active rota");
    }

    #[test]
    fn oversized_lead_time_does_not_overflow() {
        let mut settings = settings();
        settings.lead_time_hours = 4_000_000_000;
        let rota = rota(Some(3));
        let counts = BookingCounts::new();
        let holidays = HashSet::new();
        let inputs = Inputs {
            settings: &settings,
            rota: Some(&rota),
            counts: &counts,
            holidays: &holidays,
        };
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();

        let tomorrow = detail(slot_detail(&inputs, date("2024-06-11"), 0, now));
        assert!(tomorrow.slots.iter().all(|s| s.can_book));

        let today = detail(slot_detail(&inputs, date(MONDAY), 0, now));
        assert_eq!(today.slots.len(), 14);
        assert!(today.slots.iter().all(|s| !s.can_book));
    }
}

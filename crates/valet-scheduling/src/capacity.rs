//! Daily booking capacity guard.

use chrono::NaiveDate;
use valet_store::Rota;

/// Outcome of a capacity check for one valet and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityCheck {
    /// A new booking fits.
    pub accepted: bool,
    /// The valet's capacity for the date's weekday.
    pub max_capacity: u32,
    /// Open bookings the valet already holds that day.
    pub current_count: u32,
}

/// Decide whether one more booking fits on `date`.
///
/// Capacity comes from the rota's entry for the date's weekday, falling back
/// to the default when unset. Availability of the weekday is not consulted.
#[must_use]
pub fn check_capacity(rota: &Rota, date: NaiveDate, existing_open_count: u32) -> CapacityCheck {
    let max_capacity = rota.day_for(date).effective_capacity();
    CapacityCheck {
        accepted: existing_open_count < max_capacity,
        max_capacity,
        current_count: existing_open_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use valet_core::{RotaId, ValetId, Weekday};
    use valet_store::{DaySchedule, WeekSchedule, DEFAULT_DAILY_CAPACITY};

    fn rota_with(weekday: Weekday, capacity: Option<u32>) -> Rota {
        let mut days = WeekSchedule::weekdays_only();
        days.set(
            weekday,
            DaySchedule {
                available: true,
                capacity,
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
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn rejects_when_full() {
        let rota = rota_with(Weekday::Monday, Some(3));
        let check = check_capacity(&rota, monday(), 3);
        assert_eq!(
            check,
            CapacityCheck {
                accepted: false,
                max_capacity: 3,
                current_count: 3,
            }
        );
    }

    #[test]
    fn accepts_below_capacity() {
        let rota = rota_with(Weekday::Monday, Some(5));
        let check = check_capacity(&rota, monday(), 4);
        assert!(check.accepted);
        assert_eq!(check.max_capacity, 5);
    }

    #[test]
    fn unset_capacity_uses_default() {
        let rota = rota_with(Weekday::Monday, None);
        let check = check_capacity(&rota, monday(), DEFAULT_DAILY_CAPACITY - 1);
        assert!(check.accepted);
        assert_eq!(check.max_capacity, DEFAULT_DAILY_CAPACITY);

        let check = check_capacity(&rota, monday(), DEFAULT_DAILY_CAPACITY);
        assert!(!check.accepted);
    }

    #[test]
    fn capacity_follows_the_dates_weekday() {
        let rota = rota_with(Weekday::Tuesday, Some(1));
        let tuesday = monday().succ_opt().unwrap();
        assert!(!check_capacity(&rota, tuesday, 1).accepted);
        assert!(check_capacity(&rota, monday(), 1).accepted);
    }
}

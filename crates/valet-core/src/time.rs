//! Clock and calendar types.
//!
//! Slot generation works on minute-of-day integers rather than wall-clock
//! objects, and weekdays are derived from calendar dates alone, so nothing in
//! here depends on the host's local timezone.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::TimeError;

/// Number of minutes in a day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute resolution, stored as minutes since midnight.
///
/// Renders as zero-padded `HH:MM`. Parsing also accepts `HH:MM:SS` (as
/// returned by SQL `TIME` columns); the seconds are dropped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime(u16);

impl SlotTime {
    /// Midnight.
    pub const MIDNIGHT: Self = Self(0);

    /// Create a `SlotTime` from minutes since midnight.
    ///
    /// Returns `None` if `minutes` is a day or more.
    #[must_use]
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(Self(minutes))
        } else {
            None
        }
    }

    /// Create a `SlotTime` from an hour and minute.
    #[must_use]
    pub const fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour as u16 * 60 + minute as u16))
        } else {
            None
        }
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Hour component (0-23).
    #[must_use]
    pub const fn hour(self) -> u8 {
        // Always < 24.
        #[allow(clippy::cast_possible_truncation)]
        let hour = (self.0 / 60) as u8;
        hour
    }

    /// Minute component (0-59).
    #[must_use]
    pub const fn minute(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let minute = (self.0 % 60) as u8;
        minute
    }

    /// Convert to a `chrono::NaiveTime`.
    #[must_use]
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Parse `HH:MM` or `HH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Returns `TimeError::InvalidTime` if the input is not a valid time of day.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let invalid = || TimeError::InvalidTime(s.to_string());

        let mut parts = s.split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let hour = parse_component(hour, 1..=2).ok_or_else(invalid)?;
        let minute = parse_component(minute, 2..=2).ok_or_else(invalid)?;
        if let Some(second) = second {
            let second = parse_component(second, 2..=2).ok_or_else(invalid)?;
            if second >= 60 {
                return Err(invalid());
            }
        }

        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

fn parse_component(s: &str, width: std::ops::RangeInclusive<usize>) -> Option<u8> {
    if !width.contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Debug for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotTime({self})")
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for SlotTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SlotTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SlotTime> for String {
    fn from(time: SlotTime) -> Self {
        time.to_string()
    }
}

/// Day of the week, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    /// Sunday.
    Sunday,
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
}

impl Weekday {
    /// All weekdays in index order.
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// The weekday of a calendar date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_sunday() as usize]
    }

    /// Position in [`Weekday::ALL`] (Sunday = 0).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase English name, as used in column names and responses.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `TimeError::InvalidDate` for any other shape or an impossible date.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeError> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(TimeError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TimeError::InvalidDate(s.to_string()))
}

/// Format a calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_time_parse_and_display() {
        let t = SlotTime::parse("09:30").unwrap();
        assert_eq!(t.minutes(), 570);
        assert_eq!(t.to_string(), "09:30");

        let t = SlotTime::parse("9:05").unwrap();
        assert_eq!(t.to_string(), "09:05");
    }

    #[test]
    fn slot_time_accepts_seconds() {
        let t = SlotTime::parse("13:00:00").unwrap();
        assert_eq!(t, SlotTime::from_hm(13, 0).unwrap());
    }

    #[test]
    fn slot_time_rejects_garbage() {
        for input in ["", "24:00", "12:60", "12", "12:5", "ab:cd", "12:00:61", "1:2:3:4"] {
            assert!(SlotTime::parse(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn slot_time_serde_json() {
        let t = SlotTime::from_hm(17, 45).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"17:45\"");
        let parsed: SlotTime = serde_json::from_str("\"17:45:00\"").unwrap();
        assert_eq!(parsed, t);
    }

    #[test]
    fn slot_time_bounds() {
        assert!(SlotTime::from_minutes(MINUTES_PER_DAY).is_none());
        assert_eq!(SlotTime::from_minutes(0), Some(SlotTime::MIDNIGHT));
        assert!(SlotTime::from_hm(23, 59).is_some());
    }

    #[test]
    fn weekday_of_date() {
        // 2024-06-02 was a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert_eq!(Weekday::of(sunday), Weekday::Sunday);
        assert_eq!(Weekday::of(sunday.succ_opt().unwrap()), Weekday::Monday);
        assert_eq!(Weekday::Saturday.index(), 6);
        assert_eq!(Weekday::Wednesday.name(), "wednesday");
    }

    #[test]
    fn strict_date_parsing() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        for input in ["2024-2-29", "2023-02-29", "20240229", "2024-02-29T00:00:00Z", ""] {
            assert!(parse_date(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn date_formatting() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(date), "2024-01-05");
    }
}

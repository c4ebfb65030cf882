//! Calendar date to content-slot mapping.
//!
//! Readings are authored against a fixed 366-slot calendar. In leap years slots
//! map one-to-one onto days of the year. In common years February 29 does not
//! exist, so every day from March 1 onwards is shifted forward by one slot to keep
//! content aligned with the real calendar (March 1 is always slot 61).
//!
//! All arithmetic is done on [`chrono::NaiveDate`], a plain local calendar date
//! with no time or offset attached, so timezone offsets and DST transitions can
//! never shift a day count.

use crate::constants::{
    DATE_FORMAT_COMPACT, DATE_FORMAT_ISO, LAST_UNSHIFTED_DAY, LEAP_DAY_SLOT, SLOTS_PER_CALENDAR,
};
use crate::errors::CalendarError;
use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar day in the user's local timezone.
///
/// # Examples
///
/// ```
/// use daily_paths::calendar::CalendarDate;
///
/// let date = CalendarDate::new(2024, 3, 1).unwrap();
/// assert_eq!(date.to_string(), "2024-03-01");
/// assert!(CalendarDate::new(2023, 2, 29).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Creates a date from its components, failing with `InvalidDate` when the
    /// combination is not a real day.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(CalendarDate)
            .ok_or(CalendarError::InvalidDate { year, month, day })
    }

    /// Today's date in the local timezone.
    pub fn today() -> Self {
        CalendarDate(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// The underlying chrono date.
    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Returns the date `days` calendar days later.
    pub fn add_days(&self, days: u32) -> Result<Self, CalendarError> {
        self.0
            .checked_add_days(Days::new(u64::from(days)))
            .map(CalendarDate)
            .ok_or_else(|| CalendarError::OutOfRange(format!("{} + {} days", self, days)))
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        CalendarDate(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_local_key(*self))
    }
}

/// A position in the fixed 366-slot content calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ScheduledSlot(u16);

impl ScheduledSlot {
    /// Validates a raw slot number.
    ///
    /// ```
    /// use daily_paths::calendar::ScheduledSlot;
    ///
    /// assert_eq!(ScheduledSlot::new(61).unwrap().get(), 61);
    /// assert!(ScheduledSlot::new(0).is_err());
    /// assert!(ScheduledSlot::new(367).is_err());
    /// ```
    pub fn new(slot: u32) -> Result<Self, CalendarError> {
        if (1..=SLOTS_PER_CALENDAR).contains(&slot) {
            Ok(ScheduledSlot(slot as u16))
        } else {
            Err(CalendarError::InvalidSlot(slot))
        }
    }

    pub fn get(&self) -> u32 {
        u32::from(self.0)
    }
}

impl TryFrom<u32> for ScheduledSlot {
    type Error = CalendarError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ScheduledSlot::new(value)
    }
}

impl From<ScheduledSlot> for u32 {
    fn from(slot: ScheduledSlot) -> Self {
        slot.get()
    }
}

impl fmt::Display for ScheduledSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gregorian leap-year rule.
///
/// ```
/// use daily_paths::calendar::is_leap_year;
///
/// assert!(is_leap_year(2024));
/// assert!(is_leap_year(2000));
/// assert!(!is_leap_year(1900));
/// assert!(!is_leap_year(2023));
/// ```
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Real 1-based day of the year (January 1 = 1).
///
/// Counted as whole days between January 1 and the date, both as offset-free
/// midnights of the same year.
pub fn day_of_year(date: CalendarDate) -> u32 {
    let jan_first = NaiveDate::from_yo_opt(date.year(), 1).unwrap_or(date.naive());
    let elapsed = date.naive().signed_duration_since(jan_first).num_days();
    elapsed as u32 + 1
}

/// Maps a calendar date to its leap-year-corrected content slot.
///
/// ```
/// use daily_paths::calendar::{to_scheduled_slot, CalendarDate};
///
/// let slot = |y, m, d| to_scheduled_slot(CalendarDate::new(y, m, d).unwrap()).get();
/// assert_eq!(slot(2023, 2, 28), 59);
/// assert_eq!(slot(2024, 2, 29), 60);
/// assert_eq!(slot(2023, 3, 1), 61);
/// assert_eq!(slot(2024, 3, 1), 61);
/// ```
pub fn to_scheduled_slot(date: CalendarDate) -> ScheduledSlot {
    let real = day_of_year(date);
    let slot = if is_leap_year(date.year()) || real <= LAST_UNSHIFTED_DAY {
        real
    } else {
        real + 1
    };
    // A common year has 365 days, so the shifted value tops out at 366.
    ScheduledSlot(slot as u16)
}

/// Treats `slot` as a plain day offset into `year`.
///
/// No leap-year correction is applied here: this is only used to place slots on
/// a date picker. Slot 366 of a common year rolls over to January 1 of the next
/// year.
pub fn from_scheduled_slot(slot: ScheduledSlot, year: i32) -> Result<CalendarDate, CalendarError> {
    let jan_first = CalendarDate::new(year, 1, 1)?;
    jan_first.add_days(slot.get() - 1)
}

/// Maps the slots that have content onto dates of `year`, in slot order.
///
/// Slot 60 is dropped in common years since no real day carries it, and the
/// forward correction is undone for later slots so each returned date resolves
/// back to the slot it came from.
pub fn dates_for_slots(year: i32, slots: &[ScheduledSlot]) -> Result<Vec<CalendarDate>, CalendarError> {
    let leap = is_leap_year(year);
    let mut dates = Vec::with_capacity(slots.len());
    for slot in slots {
        let raw = slot.get();
        let day = if leap || raw <= LAST_UNSHIFTED_DAY {
            raw
        } else if raw == LEAP_DAY_SLOT {
            continue;
        } else {
            raw - 1
        };
        dates.push(from_scheduled_slot(ScheduledSlot::new(day)?, year)?);
    }
    Ok(dates)
}

/// Canonical `YYYY-MM-DD` key of a local date.
///
/// Built from the local calendar components only, never from a UTC timestamp.
pub fn format_local_key(date: CalendarDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parses a `YYYY-MM-DD` key back into a local date.
pub fn parse_local_key(key: &str) -> Result<CalendarDate, CalendarError> {
    NaiveDate::parse_from_str(key, DATE_FORMAT_ISO)
        .map(CalendarDate)
        .map_err(|source| CalendarError::Unparseable {
            input: key.to_string(),
            source,
        })
}

/// Parses either `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_date_arg(input: &str) -> Result<CalendarDate, CalendarError> {
    parse_local_key(input).or_else(|_| {
        NaiveDate::parse_from_str(input, DATE_FORMAT_COMPACT)
            .map(CalendarDate)
            .map_err(|source| CalendarError::Unparseable {
                input: input.to_string(),
                source,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::new(year, month, day).unwrap()
    }

    #[test]
    fn test_day_of_year_bounds() {
        assert_eq!(day_of_year(date(2023, 1, 1)), 1);
        assert_eq!(day_of_year(date(2023, 12, 31)), 365);
        assert_eq!(day_of_year(date(2024, 12, 31)), 366);
    }

    #[test]
    fn test_march_first_is_always_slot_61() {
        assert_eq!(to_scheduled_slot(date(2023, 3, 1)).get(), 61);
        assert_eq!(to_scheduled_slot(date(2024, 3, 1)).get(), 61);
        assert_eq!(to_scheduled_slot(date(1900, 3, 1)).get(), 61);
        assert_eq!(to_scheduled_slot(date(2000, 3, 1)).get(), 61);
    }

    #[test]
    fn test_slot_60_only_for_leap_day() {
        assert_eq!(to_scheduled_slot(date(2024, 2, 29)).get(), 60);

        let mut day = date(2023, 1, 1);
        while day.year() == 2023 {
            assert_ne!(to_scheduled_slot(day).get(), 60, "{} mapped to slot 60", day);
            day = day.add_days(1).unwrap();
        }
    }

    #[test]
    fn test_december_31_is_slot_366_in_all_years() {
        assert_eq!(to_scheduled_slot(date(2023, 12, 31)).get(), 366);
        assert_eq!(to_scheduled_slot(date(2024, 12, 31)).get(), 366);
    }

    #[test]
    fn test_from_scheduled_slot_is_plain_offset() {
        let slot = ScheduledSlot::new(61).unwrap();
        assert_eq!(from_scheduled_slot(slot, 2024).unwrap(), date(2024, 3, 1));
        assert_eq!(from_scheduled_slot(slot, 2023).unwrap(), date(2023, 3, 2));

        let last = ScheduledSlot::new(366).unwrap();
        assert_eq!(from_scheduled_slot(last, 2023).unwrap(), date(2024, 1, 1));
    }

    #[test]
    fn test_dates_for_slots_round_trip_forward_mapping() {
        let slots: Vec<ScheduledSlot> = [1, 59, 60, 61, 366]
            .iter()
            .map(|s| ScheduledSlot::new(*s).unwrap())
            .collect();

        let common = dates_for_slots(2023, &slots).unwrap();
        assert_eq!(
            common,
            vec![date(2023, 1, 1), date(2023, 2, 28), date(2023, 3, 1), date(2023, 12, 31)]
        );
        for d in &common {
            assert!(slots.contains(&to_scheduled_slot(*d)));
        }

        let leap = dates_for_slots(2024, &slots).unwrap();
        assert_eq!(leap.len(), 5);
        assert_eq!(leap[2], date(2024, 2, 29));
    }

    #[test]
    fn test_format_and_parse_local_key() {
        assert_eq!(format_local_key(date(2024, 3, 1)), "2024-03-01");
        assert_eq!(format_local_key(date(987, 1, 9)), "0987-01-09");
        assert_eq!(parse_local_key("2024-03-01").unwrap(), date(2024, 3, 1));
        assert!(matches!(
            parse_local_key("2024/03/01"),
            Err(CalendarError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_parse_date_arg_accepts_compact_form() {
        assert_eq!(parse_date_arg("20230115").unwrap(), date(2023, 1, 15));
        assert_eq!(parse_date_arg("2023-01-15").unwrap(), date(2023, 1, 15));
        assert!(parse_date_arg("15/01/2023").is_err());
    }

    #[test]
    fn test_invalid_components() {
        assert!(matches!(
            CalendarDate::new(2023, 13, 1),
            Err(CalendarError::InvalidDate { month: 13, .. })
        ));
        assert!(CalendarDate::new(2023, 4, 31).is_err());
        assert!(CalendarDate::new(2023, 0, 10).is_err());
    }

    #[test]
    fn test_slot_serde_rejects_out_of_range() {
        let slot: ScheduledSlot = serde_json::from_str("61").unwrap();
        assert_eq!(slot.get(), 61);
        assert!(serde_json::from_str::<ScheduledSlot>("0").is_err());
        assert!(serde_json::from_str::<ScheduledSlot>("367").is_err());
    }

    #[test]
    fn test_dates_order_and_render_as_local_keys() {
        let earlier = date(2023, 12, 31);
        let later = date(2024, 1, 1);
        assert!(earlier < later);
        assert_eq!(earlier.add_days(1).unwrap(), later);
        assert_eq!(later.to_string(), "2024-01-01");
        assert_eq!(CalendarDate::from(later.naive()), later);
    }
}

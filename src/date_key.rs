/// Calendar-day keys used to bucket files.
///
/// A `DateKey` carries no time of day and no timezone: two instants belong to
/// the same bucket exactly when they resolve to the same key.
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A normalized calendar day (day, month, year).
///
/// Equality, ordering and hashing are by calendar value.
///
/// # Examples
///
/// ```
/// use datesort::DateKey;
///
/// let key = DateKey::from_dmy(5, 3, 2024).unwrap();
/// assert_eq!(key.dir_name(), "5-3-2024");
/// assert!(DateKey::from_dmy(31, 2, 2024).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Builds a key from day, month (1-indexed) and year.
    ///
    /// Returns `None` if the values do not name a real calendar day.
    pub fn from_dmy(day: u32, month: u32, year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Returns the day of the month (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the month (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the name a newly created directory for this day gets.
    pub fn dir_name(&self) -> String {
        self.to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.day(), self.month(), self.year())
    }
}

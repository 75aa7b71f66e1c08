//! Mapping creation timestamps to day buckets.

use crate::date_key::DateKey;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use std::fs;
use std::io;
use std::path::Path;

/// Hour before which a file counts as created on the previous day.
pub const DEFAULT_DAY_BOUNDARY_HOUR: u32 = 4;

/// Reads the creation instant of a file.
///
/// Implementations make a single attempt per call. A failure means the file
/// is left where it is.
pub trait CreationDateReader: Send + Sync {
    fn creation_time(&self, path: &Path) -> io::Result<DateTime<Local>>;
}

/// Reads the birth time recorded by the filesystem.
///
/// Not every platform or filesystem records one; on those the read fails with
/// `ErrorKind::Unsupported`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsCreationDateReader;

impl CreationDateReader for FsCreationDateReader {
    fn creation_time(&self, path: &Path) -> io::Result<DateTime<Local>> {
        let created = fs::metadata(path)?.created()?;
        Ok(DateTime::<Local>::from(created))
    }
}

/// Computes the day bucket of an instant.
///
/// The working day is taken to end at `boundary_hour` rather than at
/// midnight, so a file saved at 01:30 lands in the previous day's bucket.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use datesort::{DateBucketResolver, DateKey};
///
/// let resolver = DateBucketResolver::default();
/// let late_night = Utc.with_ymd_and_hms(2024, 3, 6, 1, 30, 0).unwrap();
/// assert_eq!(resolver.resolve(&late_night), DateKey::from_dmy(5, 3, 2024).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBucketResolver {
    boundary_hour: u32,
}

impl DateBucketResolver {
    /// Creates a resolver with the given boundary hour, clamped to 0..=23.
    ///
    /// A boundary of 0 disables the shift.
    pub fn new(boundary_hour: u32) -> Self {
        Self {
            boundary_hour: boundary_hour.min(23),
        }
    }

    pub fn boundary_hour(&self) -> u32 {
        self.boundary_hour
    }

    /// Resolves an instant using the calendar fields of its own timezone.
    pub fn resolve<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> DateKey {
        self.resolve_naive(instant.naive_local())
    }

    /// Resolves a wall-clock date and time.
    pub fn resolve_naive(&self, local: NaiveDateTime) -> DateKey {
        let date = local.date();
        if local.hour() < self.boundary_hour {
            // pred_opt only fails at NaiveDate::MIN
            DateKey::from(date.pred_opt().unwrap_or(date))
        } else {
            DateKey::from(date)
        }
    }
}

impl Default for DateBucketResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_BOUNDARY_HOUR)
    }
}

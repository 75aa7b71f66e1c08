//! Recognition of date-named directories.
//!
//! A directory is a date directory when its name *starts* with a token of the
//! form `D{1,2}<sep>D{1,2}<sep>D{4}` (day, month, year), where each `<sep>` is
//! any single character that is not an ASCII letter or digit. Whatever follows
//! the token is ignored, so `5-3-2024 beach trip` is a date directory for the
//! 5th of March 2024.

use crate::date_key::DateKey;
use regex::Regex;
use std::sync::LazyLock;

static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})[^0-9A-Za-z]([0-9]{1,2})[^0-9A-Za-z]([0-9]{4})")
        .expect("date token pattern is valid")
});

/// The raw numbers found at the start of a directory name.
///
/// These are not validated against the calendar; see [`ParsedDateName::date_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDateName {
    pub day: u32,
    /// 1-indexed, the same convention used when naming new directories.
    pub month: u32,
    pub year: i32,
}

impl ParsedDateName {
    /// Converts the parsed numbers into a key, if they name a real day.
    pub fn date_key(&self) -> Option<DateKey> {
        DateKey::from_dmy(self.day, self.month, self.year)
    }
}

/// Parses directory names for a leading date token.
pub struct DirectoryNameParser;

impl DirectoryNameParser {
    /// Parses the leading date token of `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use datesort::date_dir::DirectoryNameParser;
    ///
    /// let parsed = DirectoryNameParser::parse("5-3-2024-notes").unwrap();
    /// assert_eq!((parsed.day, parsed.month, parsed.year), (5, 3, 2024));
    ///
    /// assert!(DirectoryNameParser::parse("notes-5-3-2024").is_none());
    /// assert!(DirectoryNameParser::parse("2024-3-5").is_none());
    /// ```
    pub fn parse(name: &str) -> Option<ParsedDateName> {
        let captures = DATE_TOKEN.captures(name)?;

        Some(ParsedDateName {
            day: captures[1].parse().ok()?,
            month: captures[2].parse().ok()?,
            year: captures[3].parse().ok()?,
        })
    }

    /// Parses `name` and validates it as a calendar day in one step.
    pub fn date_key(name: &str) -> Option<DateKey> {
        Self::parse(name)?.date_key()
    }
}

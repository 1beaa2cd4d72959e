use crate::error::{GreenhubError, Result};
use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Noon keeps the day stable across the committer's and the viewer's time zones.
const GIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT12:00:00";

/// A calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Parse `input`, or take the current local date when `None`.
    pub fn new(input: Option<&str>) -> Result<Self> {
        match input {
            Some(s) => s.parse(),
            None => Ok(Self::today()),
        }
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| GreenhubError::Parse(format!("Invalid date: {year}-{month}-{day}")))
    }

    /// ISO weekday: Monday is 1, Sunday is 7.
    pub fn get_weekday(&self) -> u32 {
        self.0.weekday().number_from_monday()
    }

    pub fn tomorrow(&mut self) -> &mut Self {
        self.0 = self.0.succ_opt().unwrap_or(NaiveDate::MAX);
        self
    }

    pub fn days_before(&mut self, n: u64) -> &mut Self {
        self.0 = self.0.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN);
        self
    }

    pub fn weeks_before(&mut self, n: u64) -> &mut Self {
        self.days_before(n.saturating_mul(7))
    }

    /// Non-mutating offset forward by `n` days.
    pub fn plus_days(self, n: u64) -> Self {
        Self(self.0.checked_add_days(Days::new(n)).unwrap_or(NaiveDate::MAX))
    }

    /// Timestamp accepted by both `git commit --date` and `GIT_COMMITTER_DATE`.
    pub fn git_timestamp(&self) -> String {
        self.0.format(GIT_TIMESTAMP_FORMAT).to_string()
    }
}

impl FromStr for Date {
    type Err = GreenhubError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|e| GreenhubError::Parse(format!("Invalid date '{s}': {e}")))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Days from `start` (inclusive) to `end` (exclusive).
///
/// Empty when `start >= end`. Iterating does not consume the range, so the
/// same value can be walked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.end.0 - self.start.0).num_days() as usize
    }

    pub fn iter(&self) -> DateIter {
        DateIter {
            next: self.start,
            end: self.end,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = Date;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct DateIter {
    next: Date,
    end: Date,
}

impl Iterator for DateIter {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        if self.next >= self.end {
            return None;
        }
        let current = self.next;
        self.next.tomorrow();
        Some(current)
    }
}

/// First day shown by a year-long contribution calendar ending at `today`.
///
/// The calendar's columns start on Sunday, so the anchor is 53 weeks back,
/// pulled further back to the preceding Sunday when `today` is not one.
pub fn first_date_from(today: Date) -> Date {
    let weekday = today.get_weekday();
    let mut date = today;
    date.weeks_before(53);
    if weekday != 7 {
        date.days_before(u64::from(weekday));
    }
    date
}

pub fn get_first_date() -> Date {
    first_date_from(Date::today())
}

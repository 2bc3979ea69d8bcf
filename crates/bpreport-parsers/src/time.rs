//! Time parsing and formatting utilities for report output.

use chrono::{Local, NaiveDate, TimeZone};
use std::fmt::Display;
use thiserror::Error;

/// Seconds added to an end date so the whole day is included.
const END_OF_DAY_SECS: i64 = 86_399;

/// Error type for date arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("date values must be in dd/mmm/yyyy format, got {0:?}")]
    InvalidFormat(String),
    #[error("date {0:?} does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

/// Layout for verbose timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLayout {
    /// dd/Mon/yyyy (e.g. "05/May/2003 14:03:09")
    #[default]
    DayMonthYear,
    /// mm/dd/yyyy
    MonthDayYear,
    /// yyyy/mm/dd
    YearMonthDay,
}

impl DateLayout {
    /// strftime pattern, always ending in `%H:%M:%S`.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::DayMonthYear => "%d/%b/%Y %H:%M:%S",
            Self::MonthDayYear => "%m/%d/%Y %H:%M:%S",
            Self::YearMonthDay => "%Y/%m/%d %H:%M:%S",
        }
    }
}

/// Parse an epoch-seconds field.
pub fn parse_epoch(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

/// Format epoch seconds in the given time zone.
///
/// Returns None if the instant is outside chrono's representable range.
pub fn format_timestamp_in<Tz>(epoch: i64, layout: DateLayout, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_opt(epoch, 0)
        .single()
        .map(|dt| dt.format(layout.pattern()).to_string())
}

/// Format epoch seconds in local time.
pub fn format_timestamp(epoch: i64, layout: DateLayout) -> Option<String> {
    format_timestamp_in(epoch, layout, &Local)
}

/// Format a number of seconds as `H:MM:SS` (hours are not capped at 24).
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}:{:02}:{:02}", hours, mins, secs)
}

/// Parse a `dd/mmm/yyyy` date argument as local midnight, in epoch seconds.
pub fn parse_report_date(s: &str) -> Result<i64, DateError> {
    let date = NaiveDate::parse_from_str(s.trim(), "%d/%b/%Y")
        .map_err(|_| DateError::InvalidFormat(s.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DateError::InvalidFormat(s.to_string()))?;

    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| DateError::NonexistentLocalTime(s.to_string()))
}

/// Inclusive window of job start times to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: i64,
    pub end: i64,
}

impl DateRange {
    /// Everything from the epoch up to `now`.
    pub fn until(now: i64) -> Self {
        Self { start: 0, end: now }
    }

    /// Resolve the range from command-line style arguments.
    ///
    /// `end` covers the whole named day. `hours_ago` counts back from the
    /// resolved end and takes precedence over `start`.
    pub fn from_args(
        start: Option<&str>,
        end: Option<&str>,
        hours_ago: Option<u64>,
        now: i64,
    ) -> Result<Self, DateError> {
        let end = match end {
            Some(s) => parse_report_date(s)? + END_OF_DAY_SECS,
            None => now,
        };
        let start = match (hours_ago, start) {
            (Some(hours), _) => {
                let hours = i64::try_from(hours).unwrap_or(i64::MAX);
                end.saturating_sub(hours.saturating_mul(3600))
            }
            (None, Some(s)) => parse_report_date(s)?,
            (None, None) => 0,
        };
        Ok(Self { start, end })
    }

    pub fn contains(&self, epoch: i64) -> bool {
        epoch >= self.start && epoch <= self.end
    }
}

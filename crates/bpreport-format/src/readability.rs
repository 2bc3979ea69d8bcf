//! Human readable rendering of raw column values.
//!
//! Anything that is not in a table or does not parse comes back unchanged.

use bpreport_parsers::{
    format_elapsed, format_timestamp, format_timestamp_in, parse_epoch, DateLayout,
};
use chrono::Utc;
use std::borrow::Cow;

static JOB_TYPES: [(&str, &str); 8] = [
    ("0", "Backup"),
    ("1", "Archive"),
    ("2", "Restore"),
    ("3", "Verify"),
    ("4", "Duplicate"),
    ("5", "Import"),
    ("6", "DB Backup"),
    ("7", "Vault"),
];

static JOB_STATES: [(&str, &str); 4] = [
    ("0", "Queued"),
    ("1", "Active"),
    ("2", "Re-Queued"),
    ("3", "Done"),
];

static SCHEDULE_TYPES: [(&str, &str); 5] = [
    ("0", "Full"),
    ("1", "Differential"),
    ("2", "User Backup"),
    ("3", "User Archive"),
    ("4", "Cumulative"),
];

static SUBTYPES: [(&str, &str); 3] = [
    ("0", "Immediate"),
    ("1", "Scheduled"),
    ("2", "User-Initiated"),
];

const TIME_FIELDS: [&str; 4] = ["start", "end", "trystarted", "tryended"];
const ELAPSED_FIELDS: [&str; 2] = ["elapsed", "tryelapsed"];

fn lookup(table: &[(&str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, label)| *label)
}

/// Value transform used by verbose output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readability {
    pub layout: DateLayout,
    /// Render timestamps in UTC instead of local time
    pub utc: bool,
}

impl Readability {
    /// Render `value` of column `field` for people.
    pub fn apply<'a>(&self, field: &str, value: &'a str) -> Cow<'a, str> {
        let table = match field {
            "jobtype" => Some(&JOB_TYPES[..]),
            "state" => Some(&JOB_STATES[..]),
            "schedtype" => Some(&SCHEDULE_TYPES[..]),
            "subtype" => Some(&SUBTYPES[..]),
            _ => None,
        };
        let rendered = if let Some(table) = table {
            lookup(table, value).map(str::to_string)
        } else if TIME_FIELDS.contains(&field) {
            self.timestamp(value)
        } else if ELAPSED_FIELDS.contains(&field) {
            value.trim().parse::<u64>().ok().map(format_elapsed)
        } else {
            None
        };

        rendered.map_or(Cow::Borrowed(value), Cow::Owned)
    }

    fn timestamp(&self, value: &str) -> Option<String> {
        let epoch = parse_epoch(value)?;
        if self.utc {
            format_timestamp_in(epoch, self.layout, &Utc)
        } else {
            format_timestamp(epoch, self.layout)
        }
    }
}

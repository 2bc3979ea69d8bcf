//! Shared parsing utilities for bpdbjobs report output.
//!
//! This crate provides the line splitter and the time helpers used by
//! the decoder, the ingestion loop and the formatting layer.

pub mod fields;
pub mod time;

pub use fields::{split_record_line, SplitError};
pub use time::{
    format_elapsed, format_timestamp, format_timestamp_in, parse_epoch, parse_report_date,
    DateError, DateLayout, DateRange,
};

/// Parse a non-negative count field, tolerating surrounding whitespace.
pub fn parse_count(s: &str) -> Option<usize> {
    s.trim().parse().ok()
}

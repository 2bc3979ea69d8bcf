//! Ingestion loop: split, filter, decode and bucket report lines.

use crate::types::{JobState, StateBuckets};
use bpreport_core::{decode, DecodeError, JobRecord};
use bpreport_parsers::{parse_epoch, split_record_line, DateRange, SplitError};
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Why a line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("cannot split line: {0}")]
    Split(#[from] SplitError),
    #[error("cannot decode line: {0}")]
    Decode(#[from] DecodeError),
    #[error("start time is not numeric: {0:?}")]
    InvalidStart(String),
    #[error("state is not numeric: {0:?}")]
    InvalidState(String),
}

/// A rejected line, reported once and then skipped.
#[derive(Debug, Clone)]
pub struct LineFailure {
    /// Input name ("-" for stdin)
    pub source: String,
    /// 1-based line number within the input
    pub line_number: usize,
    /// The raw line, without its terminator
    pub line: String,
    pub error: IngestError,
    /// Whatever the decoder managed to read
    pub partial: Option<Box<JobRecord>>,
}

/// Which lines make it into the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestFilter {
    /// Inclusive window on the job start time
    pub range: DateRange,
    /// Keep only backup jobs (type 0) that ran from a real schedule
    pub backups_only: bool,
}

impl Default for IngestFilter {
    fn default() -> Self {
        Self {
            range: DateRange::until(i64::MAX),
            backups_only: false,
        }
    }
}

impl IngestFilter {
    /// Backup check on the raw fields, before decoding.
    ///
    /// Lines too short to tell are let through so the decoder reports them.
    fn skips_fields(&self, fields: &[String]) -> bool {
        if !self.backups_only {
            return false;
        }
        match (fields.get(1), fields.get(5)) {
            (Some(job_type), Some(schedule)) => job_type != "0" || schedule == "-",
            _ => false,
        }
    }
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Non-blank lines seen
    pub lines: usize,
    /// Records filed into a bucket
    pub stored: usize,
    /// Records already present in their bucket
    pub duplicates: usize,
    /// Lines dropped by the backup or date filter, or with no bucket state
    pub filtered: usize,
    /// Lines rejected with a [`LineFailure`]
    pub failed: usize,
}

/// How a reader was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Finished,
    Interrupted,
}

/// A rejected line's error and partially decoded record.
type Rejection = (IngestError, Option<Box<JobRecord>>);

/// What happened to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOutcome {
    Stored,
    Duplicate,
    Filtered,
}

/// Accumulates decoded records from any number of inputs.
#[derive(Debug, Default)]
pub struct Ingestor {
    filter: IngestFilter,
    buckets: StateBuckets,
    report: IngestReport,
}

impl Ingestor {
    pub fn new(filter: IngestFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn buckets(&self) -> &StateBuckets {
        &self.buckets
    }

    pub fn report(&self) -> IngestReport {
        self.report
    }

    pub fn finish(self) -> (StateBuckets, IngestReport) {
        (self.buckets, self.report)
    }

    /// Process one line. Blank lines are ignored.
    pub fn ingest_line(
        &mut self,
        source: &str,
        line_number: usize,
        line: &str,
    ) -> Result<(), LineFailure> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return Ok(());
        }
        self.report.lines += 1;

        match self.classify(line) {
            Ok(LineOutcome::Stored) => self.report.stored += 1,
            Ok(LineOutcome::Duplicate) => self.report.duplicates += 1,
            Ok(LineOutcome::Filtered) => self.report.filtered += 1,
            Err((error, partial)) => {
                self.report.failed += 1;
                // The caller owns user-facing diagnostics for rejected lines.
                tracing::trace!(source, line_number, %error, "skipping report line");
                return Err(LineFailure {
                    source: source.to_string(),
                    line_number,
                    line: line.to_string(),
                    error,
                    partial,
                });
            }
        }
        Ok(())
    }

    fn classify(&mut self, line: &str) -> Result<LineOutcome, Rejection> {
        let fields = split_record_line(line).map_err(|e| -> Rejection { (e.into(), None) })?;
        if self.filter.skips_fields(&fields) {
            return Ok(LineOutcome::Filtered);
        }

        let record =
            decode(&fields).map_err(|f| -> Rejection { (f.error.into(), Some(f.partial)) })?;

        let Some(start) = parse_epoch(record.start()) else {
            let error = IngestError::InvalidStart(record.start().to_string());
            return Err((error, Some(Box::new(record))));
        };
        if !self.filter.range.contains(start) {
            return Ok(LineOutcome::Filtered);
        }

        let Some(code) = parse_epoch(record.state()) else {
            let error = IngestError::InvalidState(record.state().to_string());
            return Err((error, Some(Box::new(record))));
        };
        let Some(state) = JobState::from_code(code) else {
            tracing::debug!(job_id = record.job_id(), code, "state has no bucket");
            return Ok(LineOutcome::Filtered);
        };

        if self.buckets.insert(state, record) {
            Ok(LineOutcome::Stored)
        } else {
            Ok(LineOutcome::Duplicate)
        }
    }

    /// Process every line of a reader.
    ///
    /// Each rejected line is handed to `on_failure` and reading continues.
    /// Bytes that are not valid UTF-8 are replaced rather than failing the
    /// read. `interrupted` is checked before every line.
    pub fn ingest_reader<R, F>(
        &mut self,
        source: &str,
        mut reader: R,
        interrupted: &AtomicBool,
        mut on_failure: F,
    ) -> io::Result<ReadOutcome>
    where
        R: BufRead,
        F: FnMut(&LineFailure),
    {
        let mut buf = Vec::new();
        let mut line_number = 0;

        loop {
            if interrupted.load(Ordering::Relaxed) {
                return Ok(ReadOutcome::Interrupted);
            }
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(ReadOutcome::Finished);
            }
            line_number += 1;

            let line = String::from_utf8_lossy(&buf);
            if let Err(failure) = self.ingest_line(source, line_number, &line) {
                on_failure(&failure);
            }
        }
    }
}

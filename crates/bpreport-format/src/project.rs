//! Column projection of decoded records into report rows.

use crate::readability::Readability;
use crate::spec::FieldSpec;
use bpreport_core::{is_attempt_field, Attempt, Generation, JobRecord};
use bpreport_parsers::DateLayout;
use std::collections::BTreeMap;

/// Column separator for report rows.
pub const SEPARATOR: &str = ",";

/// Output options shared by every row of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Apply [`Readability`] to every value
    pub verbose: bool,
    pub layout: DateLayout,
    /// Render timestamps in UTC instead of local time
    pub utc: bool,
}

impl ReportOptions {
    pub(crate) fn readability(&self) -> Option<Readability> {
        self.verbose.then_some(Readability {
            layout: self.layout,
            utc: self.utc,
        })
    }
}

/// Project one record.
///
/// With an empty spec the record's own generation picks the columns. If
/// any column is per-try the record yields one row per try, in try order,
/// with job columns repeated on each; a record without tries then yields
/// nothing. Otherwise it yields exactly one row.
pub fn project_record(
    record: &JobRecord,
    spec: &FieldSpec,
    options: &ReportOptions,
) -> Vec<Vec<String>> {
    let columns: Vec<&str> = if spec.is_empty() {
        record.generation().default_fields()
    } else {
        spec.fields().iter().map(String::as_str).collect()
    };
    let readability = options.readability();

    // Generation defaults never include try columns.
    if spec.has_attempt_fields() {
        let mut attempts: Vec<&Attempt> = record.attempts.iter().collect();
        attempts.sort_by_key(|a| a.index);
        attempts
            .into_iter()
            .map(|attempt| row(record, Some(attempt), &columns, readability.as_ref()))
            .collect()
    } else {
        vec![row(record, None, &columns, readability.as_ref())]
    }
}

fn row(
    record: &JobRecord,
    attempt: Option<&Attempt>,
    columns: &[&str],
    readability: Option<&Readability>,
) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            let value = attempt
                .filter(|_| is_attempt_field(column))
                .and_then(|a| a.value(column))
                .or_else(|| record.value(column))
                .unwrap_or_default();
            match readability {
                Some(r) => r.apply(column, value).into_owned(),
                None => value.to_string(),
            }
        })
        .collect()
}

/// Project every record of a bucket, in job id order.
pub fn project(
    records: &BTreeMap<String, JobRecord>,
    spec: &FieldSpec,
    options: &ReportOptions,
) -> Vec<Vec<String>> {
    records
        .values()
        .flat_map(|record| project_record(record, spec, options))
        .collect()
}

/// Join a row with [`SEPARATOR`]. Values are not quoted or escaped.
pub fn join_row(row: &[String]) -> String {
    row.join(SEPARATOR)
}

/// Upper-cased column names. An empty spec gets the full modern column list.
pub fn header_row(spec: &FieldSpec) -> String {
    let names: Vec<String> = if spec.is_empty() {
        Generation::Modern
            .default_fields()
            .iter()
            .map(|f| f.to_uppercase())
            .collect()
    } else {
        spec.fields().iter().map(|f| f.to_uppercase()).collect()
    };
    names.join(SEPARATOR)
}

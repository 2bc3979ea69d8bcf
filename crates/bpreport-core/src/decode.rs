//! Decoder for flat report lines.
//!
//! Layout, left to right:
//!
//! ```text
//! 32 fixed fields (last = filelistcount)
//! filelistcount paths
//! trycount
//! per try: 9 head fields (last = trystatuscount), trystatuscount lines, 2 tail fields
//! optional 13-field mid block
//! optional 8-field modern block (only after the mid block)
//! ```
//!
//! A shortfall before the optional blocks fails the line. A shortfall in an
//! optional block just means an older server wrote it.

use crate::fields::{
    ATTEMPT_HEAD_FIELDS, ATTEMPT_TAIL_FIELDS, FIXED_FIELDS, MID_FIELDS, MODERN_FIELDS,
};
use crate::types::{Attempt, JobRecord};
use bpreport_parsers::parse_count;
use std::fmt;
use thiserror::Error;

/// Mandatory part of the layout a decode error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Fixed,
    FileList,
    TryCount,
    AttemptHead,
    StatusLines,
    AttemptTail,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fixed => "fixed fields",
            Self::FileList => "file list",
            Self::TryCount => "try count",
            Self::AttemptHead => "try fields",
            Self::StatusLines => "try status lines",
            Self::AttemptTail => "try written counters",
        };
        f.write_str(name)
    }
}

/// Why a line could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated input in {section}: needed {needed} fields, {remaining} left")]
    TruncatedInput {
        section: Section,
        needed: usize,
        remaining: usize,
    },
    #[error("malformed count in {field}: {value:?}")]
    MalformedCount { field: &'static str, value: String },
}

/// A failed decode, keeping everything needed to report the line.
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct DecodeFailure {
    /// Sections decoded before the failure
    pub partial: Box<JobRecord>,
    #[source]
    pub error: DecodeError,
    /// The fields handed to the decoder
    pub input: Vec<String>,
}

/// Bounds-checked position in the field sequence.
struct FieldCursor<'a> {
    fields: &'a [String],
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    fn new(fields: &'a [String]) -> Self {
        Self { fields, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.fields.len() - self.pos
    }

    fn rest(&self) -> &'a [String] {
        &self.fields[self.pos..]
    }

    /// Consume `n` fields if that many remain, otherwise leave the cursor alone.
    fn take(&mut self, n: usize) -> Option<&'a [String]> {
        let end = self.pos.checked_add(n)?;
        let taken = self.fields.get(self.pos..end)?;
        self.pos = end;
        Some(taken)
    }

    /// Like [`take`](Self::take), but a shortfall fails the line.
    fn require(&mut self, n: usize, section: Section) -> Result<&'a [String], DecodeError> {
        let remaining = self.remaining();
        self.take(n).ok_or(DecodeError::TruncatedInput {
            section,
            needed: n,
            remaining,
        })
    }
}

fn count_field(field: &'static str, value: &str) -> Result<usize, DecodeError> {
    parse_count(value).ok_or_else(|| DecodeError::MalformedCount {
        field,
        value: value.to_string(),
    })
}

/// Decode one split report line into a [`JobRecord`].
pub fn decode(fields: &[String]) -> Result<JobRecord, DecodeFailure> {
    let mut record = JobRecord::default();
    let mut cursor = FieldCursor::new(fields);

    match decode_into(&mut record, &mut cursor) {
        Ok(()) => Ok(record),
        Err(error) => Err(DecodeFailure {
            partial: Box::new(record),
            error,
            input: fields.to_vec(),
        }),
    }
}

fn decode_into(record: &mut JobRecord, cursor: &mut FieldCursor<'_>) -> Result<(), DecodeError> {
    match cursor.take(FIXED_FIELDS.len()) {
        Some(fixed) => record.fixed = fixed.to_vec(),
        None => {
            record.fixed = cursor.rest().to_vec();
            return Err(DecodeError::TruncatedInput {
                section: Section::Fixed,
                needed: FIXED_FIELDS.len(),
                remaining: cursor.remaining(),
            });
        }
    }

    let file_count = count_field("filelistcount", &record.fixed[FIXED_FIELDS.len() - 1])?;
    record.file_list = cursor.require(file_count, Section::FileList)?.to_vec();

    let try_count = cursor.require(1, Section::TryCount)?[0].clone();
    let tries = count_field("trycount", &try_count)?;
    record.try_count = Some(try_count);

    for index in 1..=tries {
        let head = cursor.require(ATTEMPT_HEAD_FIELDS.len(), Section::AttemptHead)?;
        let mut attempt = Attempt {
            index,
            head: head.to_vec(),
            ..Default::default()
        };
        let result = decode_attempt_body(&mut attempt, cursor);
        record.attempts.push(attempt);
        result?;
    }

    record.mid = cursor.take(MID_FIELDS.len()).map(<[String]>::to_vec);
    if record.mid.is_some() {
        record.modern = cursor.take(MODERN_FIELDS.len()).map(<[String]>::to_vec);
    }

    Ok(())
}

fn decode_attempt_body(
    attempt: &mut Attempt,
    cursor: &mut FieldCursor<'_>,
) -> Result<(), DecodeError> {
    let status_count = count_field(
        "trystatuscount",
        &attempt.head[ATTEMPT_HEAD_FIELDS.len() - 1],
    )?;
    attempt.status_lines = cursor.require(status_count, Section::StatusLines)?.to_vec();
    attempt.tail = cursor
        .require(ATTEMPT_TAIL_FIELDS.len(), Section::AttemptTail)?
        .to_vec();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Generation;

    fn fixed(file_count: usize) -> Vec<String> {
        let mut fields: Vec<String> = FIXED_FIELDS.iter().map(|f| format!("<{f}>")).collect();
        fields[0] = "4711".to_string();
        fields[31] = file_count.to_string();
        fields
    }

    fn attempt_fields(pid: &str, status_lines: &[&str]) -> Vec<String> {
        let mut fields = vec![
            pid.to_string(),
            "stu1".to_string(),
            "media1".to_string(),
            "1052143389".to_string(),
            "3725".to_string(),
            "1052147114".to_string(),
            "0".to_string(),
            "the requested operation was successfully completed".to_string(),
            status_lines.len().to_string(),
        ];
        fields.extend(status_lines.iter().map(|s| s.to_string()));
        fields.push("2048".to_string());
        fields.push("17".to_string());
        fields
    }

    fn block(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("{n}-value")).collect()
    }

    fn legacy_line() -> Vec<String> {
        let mut line = fixed(0);
        line.push("0".to_string());
        line
    }

    #[test]
    fn test_decode_legacy_minimal() {
        let line = legacy_line();
        let record = decode(&line).unwrap();
        assert_eq!(record.job_id(), "4711");
        assert!(record.file_list.is_empty());
        assert!(record.attempts.is_empty());
        assert_eq!(record.try_count.as_deref(), Some("0"));
        assert_eq!(record.generation(), Generation::Legacy);
    }

    #[test]
    fn test_decode_generations_by_trailing_blocks() {
        let mut line = legacy_line();
        line.extend(block(&MID_FIELDS));
        let record = decode(&line).unwrap();
        assert_eq!(record.generation(), Generation::Mid);
        assert_eq!(record.value("stream"), Some("stream-value"));

        line.extend(block(&MODERN_FIELDS));
        let record = decode(&line).unwrap();
        assert_eq!(record.generation(), Generation::Modern);
        assert_eq!(record.value("controllinghost"), Some("controllinghost-value"));
    }

    #[test]
    fn test_decode_partial_modern_block_is_ignored() {
        let mut line = legacy_line();
        line.extend(block(&MID_FIELDS));
        line.extend(block(&MODERN_FIELDS[..5]));
        let record = decode(&line).unwrap();
        assert_eq!(record.generation(), Generation::Mid);
        assert!(record.modern.is_none());
        assert_eq!(record.job_id(), "4711");
    }

    #[test]
    fn test_decode_partial_mid_block_is_ignored() {
        let mut line = legacy_line();
        line.extend(block(&MID_FIELDS[..12]));
        let record = decode(&line).unwrap();
        assert_eq!(record.generation(), Generation::Legacy);
    }

    #[test]
    fn test_decode_file_list_and_attempts() {
        let mut line = fixed(2);
        line.push("/etc".to_string());
        line.push("/var/log, with comma".to_string());
        line.push("2".to_string());
        line.extend(attempt_fields("900", &["begin writing", "end writing"]));
        line.extend(attempt_fields("901", &[]));
        line.extend(block(&MID_FIELDS));

        let record = decode(&line).unwrap();
        assert_eq!(record.file_list, vec!["/etc", "/var/log, with comma"]);
        assert_eq!(record.attempts.len(), 2);
        assert_eq!(record.attempts[0].index, 1);
        assert_eq!(record.attempts[0].status_lines.len(), 2);
        assert_eq!(record.attempts[0].value("trypid"), Some("900"));
        assert_eq!(record.attempts[1].index, 2);
        assert!(record.attempts[1].status_lines.is_empty());
        assert_eq!(record.attempts[1].value("trybyteswritten"), Some("2048"));
        assert_eq!(record.generation(), Generation::Mid);
    }

    #[test]
    fn test_decode_consumes_exact_field_count() {
        // 32 + f + 1 + sum(9 + detail + 2) + 13 + 8
        let mut line = fixed(1);
        line.push("/etc".to_string());
        line.push("1".to_string());
        line.extend(attempt_fields("900", &["one", "two", "three"]));
        line.extend(block(&MID_FIELDS));
        line.extend(block(&MODERN_FIELDS));
        assert_eq!(line.len(), 32 + 1 + 1 + (9 + 3 + 2) + 13 + 8);

        let record = decode(&line).unwrap();
        let consumed = record.fixed.len()
            + record.file_list.len()
            + 1
            + record
                .attempts
                .iter()
                .map(|a| a.head.len() + a.status_lines.len() + a.tail.len())
                .sum::<usize>()
            + record.mid.as_ref().map_or(0, Vec::len)
            + record.modern.as_ref().map_or(0, Vec::len);
        assert_eq!(consumed, line.len());
    }

    #[test]
    fn test_decode_truncated_fixed() {
        let line = fixed(0)[..20].to_vec();
        let failure = decode(&line).unwrap_err();
        assert_eq!(
            failure.error,
            DecodeError::TruncatedInput {
                section: Section::Fixed,
                needed: 32,
                remaining: 20,
            }
        );
        assert_eq!(failure.partial.fixed.len(), 20);
        assert_eq!(failure.input, line);
    }

    #[test]
    fn test_decode_malformed_file_count() {
        let mut line = fixed(0);
        line[31] = "abc".to_string();
        line.push("0".to_string());
        let failure = decode(&line).unwrap_err();
        assert_eq!(
            failure.error,
            DecodeError::MalformedCount {
                field: "filelistcount",
                value: "abc".to_string(),
            }
        );
        assert_eq!(failure.partial.job_id(), "4711");
    }

    #[test]
    fn test_decode_file_list_longer_than_line() {
        let mut line = fixed(5);
        line.push("/only-one".to_string());
        let failure = decode(&line).unwrap_err();
        assert!(matches!(
            failure.error,
            DecodeError::TruncatedInput {
                section: Section::FileList,
                needed: 5,
                remaining: 1,
            }
        ));
    }

    #[test]
    fn test_decode_missing_try_count() {
        let line = fixed(0);
        let failure = decode(&line).unwrap_err();
        assert!(matches!(
            failure.error,
            DecodeError::TruncatedInput {
                section: Section::TryCount,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_malformed_try_count() {
        let mut line = fixed(0);
        line.push("x".to_string());
        let failure = decode(&line).unwrap_err();
        assert!(matches!(
            failure.error,
            DecodeError::MalformedCount {
                field: "trycount",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_truncated_attempt_keeps_partial_attempt() {
        let mut line = fixed(0);
        line.push("1".to_string());
        let mut attempt = attempt_fields("900", &["one", "two"]);
        attempt.truncate(10);
        line.extend(attempt);

        let failure = decode(&line).unwrap_err();
        assert!(matches!(
            failure.error,
            DecodeError::TruncatedInput {
                section: Section::StatusLines,
                needed: 2,
                remaining: 1,
            }
        ));
        assert_eq!(failure.partial.attempts.len(), 1);
        assert_eq!(failure.partial.attempts[0].value("trypid"), Some("900"));
    }

    #[test]
    fn test_decode_malformed_status_count() {
        let mut line = fixed(0);
        line.push("1".to_string());
        let mut attempt = attempt_fields("900", &[]);
        attempt[8] = "many".to_string();
        line.extend(attempt);

        let failure = decode(&line).unwrap_err();
        assert!(matches!(
            failure.error,
            DecodeError::MalformedCount {
                field: "trystatuscount",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_missing_tail_is_fatal() {
        let mut line = fixed(0);
        line.push("1".to_string());
        let mut attempt = attempt_fields("900", &[]);
        attempt.pop();
        line.extend(attempt);

        let failure = decode(&line).unwrap_err();
        assert!(matches!(
            failure.error,
            DecodeError::TruncatedInput {
                section: Section::AttemptTail,
                ..
            }
        ));
    }
}

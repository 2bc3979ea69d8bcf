//! Decoded job record types.

use crate::fields::{
    ATTEMPT_HEAD_FIELDS, ATTEMPT_TAIL_FIELDS, FIXED_FIELDS, MID_FIELDS, MODERN_FIELDS,
    TRY_COUNT_FIELD,
};
use serde::{Deserialize, Serialize};

/// Product generation that produced a line, judged by its trailing blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Generation {
    /// Fixed fields, file list and tries only
    Legacy,
    /// Adds the 13-field mid block
    Mid,
    /// Adds the 8-field modern block after the mid block
    Modern,
}

impl Generation {
    /// Built-in column list for records of this generation.
    pub fn default_fields(self) -> Vec<&'static str> {
        let mut fields = FIXED_FIELDS.to_vec();
        if self >= Self::Mid {
            fields.extend_from_slice(&MID_FIELDS);
        }
        if self == Self::Modern {
            fields.extend_from_slice(&MODERN_FIELDS);
        }
        fields
    }
}

/// One try of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based try number
    pub index: usize,

    /// Values of [`ATTEMPT_HEAD_FIELDS`], in order
    pub head: Vec<String>,

    /// Status detail lines, as many as `trystatuscount`
    pub status_lines: Vec<String>,

    /// Values of [`ATTEMPT_TAIL_FIELDS`], in order
    pub tail: Vec<String>,
}

impl Attempt {
    /// Look up a per-try column by name.
    pub fn value(&self, name: &str) -> Option<&str> {
        if let Some(idx) = ATTEMPT_HEAD_FIELDS.iter().position(|f| *f == name) {
            return self.head.get(idx).map(String::as_str);
        }
        ATTEMPT_TAIL_FIELDS
            .iter()
            .position(|f| *f == name)
            .and_then(|idx| self.tail.get(idx))
            .map(String::as_str)
    }

    /// Labelled values in wire order, without the status lines.
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, &str)> {
        ATTEMPT_HEAD_FIELDS
            .iter()
            .zip(&self.head)
            .chain(ATTEMPT_TAIL_FIELDS.iter().zip(&self.tail))
            .map(|(name, value)| (*name, value.as_str()))
    }
}

/// A job state snapshot decoded from one report line.
///
/// A record coming out of a failed decode may be incomplete: only the
/// sections read before the failure are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Values of [`FIXED_FIELDS`], in order
    pub fixed: Vec<String>,

    /// Paths listed for the job
    pub file_list: Vec<String>,

    /// Raw try count as it appeared on the line
    pub try_count: Option<String>,

    /// Tries in ascending index order
    pub attempts: Vec<Attempt>,

    /// Values of [`MID_FIELDS`] (mid and modern generations)
    pub mid: Option<Vec<String>>,

    /// Values of [`MODERN_FIELDS`] (modern generation)
    pub modern: Option<Vec<String>>,
}

impl JobRecord {
    /// Look up a job-level column by name.
    ///
    /// Returns None for names the record does not carry, such as
    /// mid-generation columns on a legacy record.
    pub fn value(&self, name: &str) -> Option<&str> {
        if name == TRY_COUNT_FIELD {
            return self.try_count.as_deref();
        }
        if let Some(idx) = FIXED_FIELDS.iter().position(|f| *f == name) {
            return self.fixed.get(idx).map(String::as_str);
        }
        if let Some(idx) = MID_FIELDS.iter().position(|f| *f == name) {
            return self.mid.as_ref().and_then(|v| v.get(idx)).map(String::as_str);
        }
        MODERN_FIELDS
            .iter()
            .position(|f| *f == name)
            .and_then(|idx| self.modern.as_ref().and_then(|v| v.get(idx)))
            .map(String::as_str)
    }

    /// Labelled job-level values in wire order, excluding the file list and tries.
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let mid = self.mid.as_deref().unwrap_or_default();
        let modern = self.modern.as_deref().unwrap_or_default();
        FIXED_FIELDS
            .iter()
            .zip(&self.fixed)
            .chain(MID_FIELDS.iter().zip(mid))
            .chain(MODERN_FIELDS.iter().zip(modern))
            .map(|(name, value)| (*name, value.as_str()))
    }

    pub fn job_id(&self) -> &str {
        self.value("jobid").unwrap_or_default()
    }

    pub fn job_type(&self) -> &str {
        self.value("jobtype").unwrap_or_default()
    }

    pub fn state(&self) -> &str {
        self.value("state").unwrap_or_default()
    }

    pub fn class(&self) -> &str {
        self.value("class").unwrap_or_default()
    }

    pub fn schedule(&self) -> &str {
        self.value("sched").unwrap_or_default()
    }

    pub fn start(&self) -> &str {
        self.value("start").unwrap_or_default()
    }

    pub fn end(&self) -> &str {
        self.value("end").unwrap_or_default()
    }

    /// Classify the record by the trailing blocks it carries.
    pub fn generation(&self) -> Generation {
        match (&self.mid, &self.modern) {
            (_, Some(_)) => Generation::Modern,
            (Some(_), None) => Generation::Mid,
            (None, None) => Generation::Legacy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn legacy_record() -> JobRecord {
        let mut fixed: Vec<String> = FIXED_FIELDS.iter().map(|f| format!("<{f}>")).collect();
        fixed[0] = "101".to_string();
        fixed[31] = "0".to_string();
        JobRecord {
            fixed,
            try_count: Some("0".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_generation_default_fields() {
        assert_eq!(Generation::Legacy.default_fields().len(), 32);
        assert_eq!(Generation::Mid.default_fields().len(), 45);
        assert_eq!(Generation::Modern.default_fields().len(), 53);
        assert_eq!(Generation::Modern.default_fields()[52], "controllinghost");
    }

    #[test]
    fn test_record_value_lookup() {
        let mut record = legacy_record();
        assert_eq!(record.job_id(), "101");
        assert_eq!(record.value("class"), Some("<class>"));
        assert_eq!(record.value("trycount"), Some("0"));
        assert_eq!(record.value("kbpersec"), None);
        assert_eq!(record.value("nonsense"), None);

        record.mid = Some(strings(&MID_FIELDS));
        assert_eq!(record.value("kbpersec"), Some("kbpersec"));
        assert_eq!(record.value("backupid"), None);
    }

    #[test]
    fn test_record_generation() {
        let mut record = legacy_record();
        assert_eq!(record.generation(), Generation::Legacy);
        record.mid = Some(strings(&MID_FIELDS));
        assert_eq!(record.generation(), Generation::Mid);
        record.modern = Some(strings(&MODERN_FIELDS));
        assert_eq!(record.generation(), Generation::Modern);
    }

    #[test]
    fn test_attempt_value_lookup() {
        let attempt = Attempt {
            index: 1,
            head: strings(&ATTEMPT_HEAD_FIELDS),
            status_lines: strings(&["line one"]),
            tail: strings(&["2048", "12"]),
        };
        assert_eq!(attempt.value("trystarted"), Some("trystarted"));
        assert_eq!(attempt.value("tryfileswritten"), Some("12"));
        assert_eq!(attempt.value("trycount"), None);
        assert_eq!(attempt.labelled().count(), 11);
    }

    #[test]
    fn test_labelled_skips_missing_blocks() {
        let record = legacy_record();
        let labels: Vec<_> = record.labelled().map(|(name, _)| name).collect();
        assert_eq!(labels, FIXED_FIELDS.to_vec());
    }
}

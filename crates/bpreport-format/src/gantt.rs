//! Start/end triples for the schedule chart.

use crate::project::SEPARATOR;
use bpreport_core::JobRecord;
use bpreport_parsers::parse_epoch;
use std::collections::BTreeMap;

/// One bar of the chart: a job (or one of its tries) from start to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttBar {
    /// `jobid__class__sched`
    pub name: String,
    pub start: i64,
    pub end: i64,
}

impl GanttBar {
    pub fn to_row(&self) -> String {
        format!("{}{SEPARATOR}{}{SEPARATOR}{}", self.name, self.start, self.end)
    }
}

/// Bars for every record, one per try, or one for the whole job if it has
/// no tries. Tries or jobs with unparseable times are skipped.
pub fn gantt_bars(records: &BTreeMap<String, JobRecord>) -> Vec<GanttBar> {
    let mut bars = Vec::new();
    for record in records.values() {
        let name = format!(
            "{}__{}__{}",
            record.job_id(),
            record.class(),
            record.schedule()
        );

        let spans: Vec<(&str, &str)> = if record.attempts.is_empty() {
            vec![(record.start(), record.end())]
        } else {
            record
                .attempts
                .iter()
                .map(|a| {
                    (
                        a.value("trystarted").unwrap_or_default(),
                        a.value("tryended").unwrap_or_default(),
                    )
                })
                .collect()
        };

        for (start, end) in spans {
            match (parse_epoch(start), parse_epoch(end)) {
                (Some(start), Some(end)) => bars.push(GanttBar {
                    name: name.clone(),
                    start,
                    end,
                }),
                _ => tracing::debug!(job_id = record.job_id(), start, end, "no chart bar"),
            }
        }
    }
    bars
}

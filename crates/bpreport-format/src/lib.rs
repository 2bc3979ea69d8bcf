//! Report formatting for decoded job records.
//!
//! Projects records onto a column list, optionally making values readable,
//! and renders the all-data tree view and gantt triples.

pub mod dump;
pub mod gantt;
pub mod project;
pub mod readability;
pub mod spec;

pub use dump::dump_record;
pub use gantt::{gantt_bars, GanttBar};
pub use project::{header_row, join_row, project, project_record, ReportOptions, SEPARATOR};
pub use readability::Readability;
pub use spec::{FieldSpec, SpecError, SAMPLE_FORMAT};

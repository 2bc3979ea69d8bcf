//! Column specifications loaded from format files.

use bpreport_core::{is_attempt_field, is_known_field};
use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use thiserror::Error;

static FIELD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z_]*$").unwrap());

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("could not open format file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered list of columns to print. Empty means "use the record's defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    fields: Vec<String>,
}

impl FieldSpec {
    /// Build a spec from column names, dropping names no record can carry.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = names
            .into_iter()
            .filter_map(|name| accept(name.as_ref()))
            .collect();
        Self { fields }
    }

    /// Parse format file contents: one column per line, `#` starts a comment.
    ///
    /// Blank lines are skipped. Malformed or unknown names are dropped.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(|line| line.split('#').next().unwrap_or_default().trim())
                .filter(|name| !name.is_empty()),
        )
    }

    pub fn load(path: &Utf8Path) -> Result<Self, SpecError> {
        let text = fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether output expands to one row per try.
    pub fn has_attempt_fields(&self) -> bool {
        self.fields.iter().any(|f| is_attempt_field(f))
    }
}

fn accept(name: &str) -> Option<String> {
    if !FIELD_NAME.is_match(name) {
        tracing::debug!(line = name, "dropping malformed format line");
        return None;
    }
    if !is_known_field(name) {
        tracing::debug!(field = name, "dropping unknown column");
        return None;
    }
    Some(name.to_string())
}

/// Example format file listing every column.
pub const SAMPLE_FORMAT: &str = "\
# sample format file for column output
# Lines starting with # and blank lines are skipped.
# Unknown column names are dropped.
# Any try* column prints one line per try; other columns are repeated.

jobid
jobtype
state
status
class
sched
client
server
start
elapsed
end
stunit
try
operation
kbytes
files
path_last_written
percent
jobpid
owner
subtype
classtype
schedtype
priority
group
master_server
retention_units
retention_period
compression
kbyteslastwritten
fileslastwritten
filelistcount
trypid
trystunit
tryserver
trystarted
tryelapsed
tryended
trystatus
trystatusdescription
trybyteswritten
tryfileswritten
parentjob
kbpersec
copy
robot
vault
profile
session
ejecttapes
srcstunit
srcserver
srcmedia
dstmedia
stream
suspendable
resumable
restartable
datamovement
frozenimage
backupid
killable
controllinghost
";

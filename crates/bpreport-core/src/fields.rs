//! Field names of the flat report layout, in wire order.

/// Leading positional fields; the last one is the file-list count.
pub const FIXED_FIELDS: [&str; 32] = [
    "jobid",
    "jobtype",
    "state",
    "status",
    "class",
    "sched",
    "client",
    "server",
    "start",
    "elapsed",
    "end",
    "stunit",
    "try",
    "operation",
    "kbytes",
    "files",
    "path_last_written",
    "percent",
    "jobpid",
    "owner",
    "subtype",
    "classtype",
    "schedtype",
    "priority",
    "group",
    "master_server",
    "retention_units",
    "retention_period",
    "compression",
    "kbyteslastwritten",
    "fileslastwritten",
    "filelistcount",
];

/// Record-level number of tries, read right after the file list.
pub const TRY_COUNT_FIELD: &str = "trycount";

/// Per-try fields before the status lines; the last one counts them.
pub const ATTEMPT_HEAD_FIELDS: [&str; 9] = [
    "trypid",
    "trystunit",
    "tryserver",
    "trystarted",
    "tryelapsed",
    "tryended",
    "trystatus",
    "trystatusdescription",
    "trystatuscount",
];

/// Per-try fields after the status lines.
pub const ATTEMPT_TAIL_FIELDS: [&str; 2] = ["trybyteswritten", "tryfileswritten"];

/// Trailing block added by mid-generation servers.
pub const MID_FIELDS: [&str; 13] = [
    "parentjob",
    "kbpersec",
    "copy",
    "robot",
    "vault",
    "profile",
    "session",
    "ejecttapes",
    "srcstunit",
    "srcserver",
    "srcmedia",
    "dstmedia",
    "stream",
];

/// Trailing block added by modern servers, only ever after [`MID_FIELDS`].
pub const MODERN_FIELDS: [&str; 8] = [
    "suspendable",
    "resumable",
    "restartable",
    "datamovement",
    "frozenimage",
    "backupid",
    "killable",
    "controllinghost",
];

/// The placeholder `try` column is a job field; anything longer that
/// starts with `try` belongs to an individual try.
const ATTEMPT_PREFIX: &str = "try";

/// Whether a column name selects per-try values.
pub fn is_attempt_field(name: &str) -> bool {
    name.starts_with(ATTEMPT_PREFIX) && name.len() > ATTEMPT_PREFIX.len()
}

/// Whether a column name can be projected from a record.
pub fn is_known_field(name: &str) -> bool {
    name == TRY_COUNT_FIELD
        || FIXED_FIELDS.contains(&name)
        || ATTEMPT_HEAD_FIELDS.contains(&name)
        || ATTEMPT_TAIL_FIELDS.contains(&name)
        || MID_FIELDS.contains(&name)
        || MODERN_FIELDS.contains(&name)
}

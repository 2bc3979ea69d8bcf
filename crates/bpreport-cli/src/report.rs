//! Report driver: read inputs, bucket jobs, write the selected output.

use crate::args::Args;
use bpreport_format::{
    dump_record, gantt_bars, header_row, join_row, project_record, FieldSpec, SpecError,
    SAMPLE_FORMAT,
};
use bpreport_parsers::DateError;
use bpreport_state::{Ingestor, LineFailure, ReadOutcome, StateBuckets};
use bpreport_store::{BucketStore, StoreError};
use camino::Utf8PathBuf;
use chrono::Local;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Input name meaning standard input.
const STDIN: &str = "-";

/// Prefix for every line of a `-d` rejection block.
const DEBUG_PREFIX: &str = "DEBUG:   ";

/// Errors that end the run. Bad report lines never do.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("file {0} does not exist")]
    MissingInput(Utf8PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Date(#[from] DateError),
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error("failed to save buckets: {0}")]
    Store(#[from] StoreError),
    #[error("failed to write report: {0}")]
    Write(#[from] io::Error),
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Interrupted,
}

/// Run a report.
///
/// Report output goes to `out`. Each rejected line produces one message on
/// `diag`: `ERROR: <line>`, or with `debug` set a `DEBUG:` block holding
/// the error and whatever was decoded. `interrupted` is polled between lines and between jobs; when
/// set, everything written so far is flushed and the run stops.
pub fn run<W, D>(
    args: &Args,
    out: &mut W,
    diag: &mut D,
    interrupted: &AtomicBool,
) -> Result<RunOutcome, ReportError>
where
    W: Write,
    D: Write,
{
    if args.sample_format {
        out.write_all(SAMPLE_FORMAT.as_bytes())?;
        out.flush()?;
        return Ok(RunOutcome::Completed);
    }

    if let Some(missing) = args
        .inputs
        .iter()
        .find(|p| p.as_str() != STDIN && !p.exists())
    {
        return Err(ReportError::MissingInput(missing.clone()));
    }

    let filter = args.ingest_filter(Local::now().timestamp())?;
    let spec = match &args.format_file {
        Some(path) => FieldSpec::load(path)?,
        None => FieldSpec::default(),
    };
    tracing::debug!(?filter, columns = spec.fields().len(), "starting report");

    let mut ingestor = Ingestor::new(filter);
    for input in &args.inputs {
        let outcome = read_input(&mut ingestor, input, args, diag, interrupted)?;
        if outcome == ReadOutcome::Interrupted {
            diag.flush()?;
            return Ok(RunOutcome::Interrupted);
        }
    }
    let (buckets, summary) = ingestor.finish();
    tracing::info!(
        lines = summary.lines,
        stored = summary.stored,
        duplicates = summary.duplicates,
        filtered = summary.filtered,
        failed = summary.failed,
        "finished reading input"
    );

    if let Some(path) = &args.save_buckets {
        BucketStore::new(path.clone()).save(&buckets)?;
        tracing::info!(path = %path, jobs = buckets.len(), "saved buckets");
    }

    if !args.writes_report() {
        return Ok(RunOutcome::Completed);
    }

    match write_report(args, &spec, &buckets, out, interrupted) {
        Ok(outcome) => Ok(outcome),
        // Reader went away (e.g. piped into `head`).
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(RunOutcome::Completed),
        Err(e) => Err(e.into()),
    }
}

fn read_input<D: Write>(
    ingestor: &mut Ingestor,
    input: &Utf8PathBuf,
    args: &Args,
    diag: &mut D,
    interrupted: &AtomicBool,
) -> Result<ReadOutcome, ReportError> {
    let name = input.as_str();
    let mut on_failure = |failure: &LineFailure| report_failure(failure, args, diag);

    let result = if name == STDIN {
        ingestor.ingest_reader(name, io::stdin().lock(), interrupted, &mut on_failure)
    } else {
        let file = File::open(input).map_err(|source| ReportError::Read {
            path: input.clone(),
            source,
        })?;
        ingestor.ingest_reader(name, BufReader::new(file), interrupted, &mut on_failure)
    };

    result.map_err(|source| ReportError::Read {
        path: input.clone(),
        source,
    })
}

fn report_failure<D: Write>(failure: &LineFailure, args: &Args, diag: &mut D) {
    let message = if args.debug {
        debug_block(failure)
    } else {
        format!("ERROR: {}\n", failure.line)
    };
    // A closed stderr must not stop the report.
    diag.write_all(message.as_bytes()).ok();
}

fn debug_block(failure: &LineFailure) -> String {
    let rule = "*".repeat(30);
    let mut lines = vec![
        rule.clone(),
        format!("File:        {}", failure.source),
        format!("Line Number: {}", failure.line_number),
        format!("Error:       {}", failure.error),
        "Decoded:".to_string(),
    ];
    if let Some(record) = failure.partial.as_deref() {
        lines.extend(
            dump_record(record, &Default::default())
                .lines()
                .map(str::to_string),
        );
    }
    lines.push(failure.line.clone());
    lines.push(rule);

    lines
        .iter()
        .map(|line| format!("{DEBUG_PREFIX}{line}\n"))
        .collect()
}

fn write_report<W: Write>(
    args: &Args,
    spec: &FieldSpec,
    buckets: &StateBuckets,
    out: &mut W,
    interrupted: &AtomicBool,
) -> io::Result<RunOutcome> {
    let options = args.report_options();
    let selection = args.selection();

    if !args.all_data && !args.gantt && !args.no_header {
        writeln!(out, "{}", header_row(spec))?;
    }

    for (state, bucket) in buckets.selected(selection) {
        tracing::debug!(state = state.label(), jobs = bucket.len(), "writing bucket");

        if args.gantt {
            for bar in gantt_bars(bucket) {
                if interrupted.load(Ordering::Relaxed) {
                    out.flush()?;
                    return Ok(RunOutcome::Interrupted);
                }
                writeln!(out, "{}", bar.to_row())?;
            }
            continue;
        }

        for record in bucket.values() {
            if interrupted.load(Ordering::Relaxed) {
                out.flush()?;
                return Ok(RunOutcome::Interrupted);
            }
            if args.all_data {
                writeln!(out, "{}", dump_record(record, &options))?;
            } else {
                for row in project_record(record, spec, &options) {
                    writeln!(out, "{}", join_row(&row))?;
                }
            }
        }
    }

    out.flush()?;
    Ok(RunOutcome::Completed)
}

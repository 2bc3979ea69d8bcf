//! Command-line arguments.

use bpreport_format::ReportOptions;
use bpreport_parsers::{DateError, DateLayout, DateRange};
use bpreport_state::{BucketSelection, IngestFilter};
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bpreport")]
#[command(about = "Turn `bpdbjobs -report -all_columns` output into readable reports")]
#[command(
    after_help = "Lines that cannot be decoded are reported on stderr as `ERROR: <line>` \
                  and skipped."
)]
pub struct Args {
    /// Report files to read ("-" for stdin)
    #[arg(required_unless_present = "sample_format")]
    pub inputs: Vec<Utf8PathBuf>,

    /// Dump every decoded value of each job, including tries
    #[arg(short = 'a', long)]
    pub all_data: bool,

    /// Log details of rejected lines to stderr
    #[arg(short, long)]
    pub debug: bool,

    /// Column format file (see --sample-format)
    #[arg(short = 'f', long = "format", value_name = "FILE")]
    pub format_file: Option<Utf8PathBuf>,

    /// Only report jobs started on or after this date (dd/mmm/yyyy)
    #[arg(short, long, value_name = "DATE")]
    pub start: Option<String>,

    /// Only report jobs started on or before this date (dd/mmm/yyyy)
    #[arg(short, long, value_name = "DATE")]
    pub end: Option<String>,

    /// Only report jobs started in the last N hours
    #[arg(long, value_name = "HOURS", conflicts_with = "start")]
    pub hours_ago: Option<u64>,

    /// Verbose dates as mm/dd/yyyy
    #[arg(long, conflicts_with = "ymd")]
    pub mdy: bool,

    /// Verbose dates as yyyy/mm/dd
    #[arg(long)]
    pub ymd: bool,

    /// Verbose dates in UTC instead of local time
    #[arg(long)]
    pub utc: bool,

    /// Save the decoded jobs as JSON (implies --quiet)
    #[arg(long, value_name = "FILE")]
    pub save_buckets: Option<Utf8PathBuf>,

    /// Show done and active jobs
    #[arg(long)]
    pub show_active: bool,

    /// Show done, active, queued and re-queued jobs
    #[arg(long)]
    pub show_all: bool,

    /// Only show scheduled backup jobs
    #[arg(long)]
    pub show_backups: bool,

    /// Omit the header line
    #[arg(long)]
    pub no_header: bool,

    /// No output on stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Human readable values
    #[arg(short, long)]
    pub verbose: bool,

    /// Print `jobid__class__sched,start,end` lines for the schedule chart
    #[arg(long, conflicts_with = "all_data")]
    pub gantt: bool,

    /// Print a sample format file and exit
    #[arg(long)]
    pub sample_format: bool,
}

impl Args {
    pub fn date_layout(&self) -> DateLayout {
        if self.mdy {
            DateLayout::MonthDayYear
        } else if self.ymd {
            DateLayout::YearMonthDay
        } else {
            DateLayout::DayMonthYear
        }
    }

    /// --show-all wins over --show-active.
    pub fn selection(&self) -> BucketSelection {
        if self.show_all {
            BucketSelection::All
        } else if self.show_active {
            BucketSelection::DoneAndActive
        } else {
            BucketSelection::Done
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            verbose: self.verbose,
            layout: self.date_layout(),
            utc: self.utc,
        }
    }

    pub fn ingest_filter(&self, now: i64) -> Result<IngestFilter, DateError> {
        let range = DateRange::from_args(
            self.start.as_deref(),
            self.end.as_deref(),
            self.hours_ago,
            now,
        )?;
        Ok(IngestFilter {
            range,
            backups_only: self.show_backups,
        })
    }

    /// Whether report output goes to stdout at all.
    pub fn writes_report(&self) -> bool {
        !self.quiet && self.save_buckets.is_none()
    }
}

//! bpreport - readable reports from bpdbjobs output.

use bpreport_cli::{ctrl_c, run, supervise, Args, RunOutcome, Supervised, INTERRUPT_GRACE};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C.
const EXIT_INTERRUPTED: u8 = 3;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.debug);

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    // Stdout stays unlocked between writes so an abandoned report cannot
    // block the final flush.
    let job = move || {
        let mut out = BufWriter::new(io::stdout());
        let mut diag = io::stderr();
        run(&args, &mut out, &mut diag, &flag)
    };

    let outcome = match supervise(job, ctrl_c(), interrupted, INTERRUPT_GRACE)
        .await
        .into_diagnostic()?
    {
        Supervised::Finished(result) => result.into_diagnostic()?,
        Supervised::Abandoned => {
            tracing::warn!("interrupted while waiting for input");
            io::stdout().flush().ok();
            // The report thread is stuck in a read; returning would wait on it.
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
    };

    match outcome {
        RunOutcome::Completed => Ok(ExitCode::SUCCESS),
        RunOutcome::Interrupted => {
            tracing::warn!("interrupted");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
    }
}

/// Log to stderr; `-d` turns on debug output, otherwise `RUST_LOG` or warnings only.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();
}

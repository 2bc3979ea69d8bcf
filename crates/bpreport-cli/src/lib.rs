//! CLI argument parsing and report driver for bpreport.

pub mod args;
pub mod report;
pub mod supervise;

pub use args::Args;
pub use report::{run, ReportError, RunOutcome};
pub use supervise::{ctrl_c, supervise, Supervised, INTERRUPT_GRACE};

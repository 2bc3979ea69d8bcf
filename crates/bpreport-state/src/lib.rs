//! Job state buckets for bpreport.
//!
//! Feeds report lines through the decoder and files the records by job state.

pub mod ingest;
pub mod types;

pub use ingest::{IngestError, IngestFilter, IngestReport, Ingestor, LineFailure, ReadOutcome};
pub use types::{BucketSelection, JobState, StateBuckets};

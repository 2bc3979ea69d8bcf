//! Interrupt handling around the blocking report.
//!
//! The report reads with plain blocking I/O, so an interrupt flag alone
//! cannot stop a read that is waiting for input. [`supervise`] runs the job
//! on the blocking pool, raises the flag when the signal fires, and gives
//! up on the job if it has not returned within the grace period.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;

/// How long a signalled job gets to notice the flag.
pub const INTERRUPT_GRACE: Duration = Duration::from_millis(250);

/// How a supervised job ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Supervised<T> {
    /// The job returned, possibly after seeing the interrupt flag
    Finished(T),
    /// The signal fired and the job was still blocked after the grace period
    Abandoned,
}

/// Run `job` on the blocking pool until it returns or `signal` fires.
///
/// On the signal, `interrupted` is set and the job has `grace` to return.
/// An abandoned job keeps its thread; the caller is expected to exit.
pub async fn supervise<T, F, S>(
    job: F,
    signal: S,
    interrupted: Arc<AtomicBool>,
    grace: Duration,
) -> Result<Supervised<T>, JoinError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
    S: Future<Output = ()>,
{
    let mut handle = tokio::task::spawn_blocking(job);

    tokio::select! {
        result = &mut handle => return result.map(Supervised::Finished),
        () = signal => {}
    }

    interrupted.store(true, Ordering::Relaxed);
    tracing::debug!(?grace, "interrupt received, waiting for the report to stop");

    match tokio::time::timeout(grace, handle).await {
        Ok(result) => result.map(Supervised::Finished),
        Err(_) => Ok(Supervised::Abandoned),
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RunOutcome;
    use bpreport_state::{IngestFilter, Ingestor, ReadOutcome};
    use std::future;
    use std::io::{self, BufReader, Read};
    use std::sync::mpsc::{self, Receiver};

    /// A reader that blocks until a chunk arrives; EOF once the sender is gone.
    struct ChannelReader(Receiver<Vec<u8>>);

    impl Read for ChannelReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.recv() {
                Ok(chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                Err(_) => Ok(0),
            }
        }
    }

    #[tokio::test]
    async fn test_finished_without_signal() {
        let flag = Arc::new(AtomicBool::new(false));
        let result = supervise(|| 7, future::pending(), flag.clone(), INTERRUPT_GRACE)
            .await
            .unwrap();
        assert_eq!(result, Supervised::Finished(7));
        assert!(!flag.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_signal_abandons_blocked_read() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let flag = Arc::new(AtomicBool::new(false));
        let job_flag = flag.clone();
        let job = move || {
            let mut ingestor = Ingestor::new(IngestFilter::default());
            let reader = BufReader::new(ChannelReader(rx));
            ingestor
                .ingest_reader("-", reader, &job_flag, |_| {})
                .map(|_| ())
        };

        let result = supervise(job, future::ready(()), flag.clone(), Duration::from_millis(50))
            .await
            .unwrap();
        assert!(matches!(result, Supervised::Abandoned));
        assert!(flag.load(Ordering::Relaxed));

        // Let the reader hit EOF so the runtime can shut down.
        drop(tx);
    }

    #[tokio::test]
    async fn test_signal_lets_responsive_job_finish() {
        let flag = Arc::new(AtomicBool::new(false));
        let job_flag = flag.clone();
        let job = move || {
            while !job_flag.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(1));
            }
            RunOutcome::Interrupted
        };

        let result = supervise(job, future::ready(()), flag, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result, Supervised::Finished(RunOutcome::Interrupted));
    }

    #[test]
    fn test_interrupted_reader_stops_between_lines() {
        let (tx, rx) = mpsc::channel();
        tx.send(b"not a report line\n".to_vec()).unwrap();
        let flag = AtomicBool::new(false);
        let mut ingestor = Ingestor::new(IngestFilter::default());
        let mut failures = 0;
        let outcome = ingestor
            .ingest_reader("-", BufReader::new(ChannelReader(rx)), &flag, |_| {
                failures += 1;
                flag.store(true, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(outcome, ReadOutcome::Interrupted);
        assert_eq!(failures, 1);
        drop(tx);
    }
}

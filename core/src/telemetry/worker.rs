//! Background telemetry polling
//!
//! The worker owns the telemetry source and publishes every snapshot into a
//! single-slot `watch` mailbox. The render loop only ever reads the latest value
//! and never blocks on the network.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::watch;

use super::fetcher::{RetryPolicy, TelemetrySource, fetch_with_retry};
use super::payload::TelemetryPayload;

/// Latest state of the telemetry mailbox.
#[derive(Debug, Clone, Default)]
pub enum TelemetryFeed {
    /// No snapshot received yet.
    #[default]
    Waiting,
    Ready(Arc<TelemetryPayload>),
    /// Retries exhausted; the worker has stopped.
    Failed(String),
}

impl TelemetryFeed {
    pub fn payload(&self) -> Option<&Arc<TelemetryPayload>> {
        match self {
            TelemetryFeed::Ready(payload) => Some(payload),
            _ => None,
        }
    }
}

pub struct FetchWorker {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FetchWorker {
    /// Start polling `source` every `interval`.
    pub fn spawn<S>(
        source: S,
        policy: RetryPolicy,
        interval: Duration,
    ) -> std::io::Result<(Self, watch::Receiver<TelemetryFeed>)>
    where
        S: TelemetrySource + Send + 'static,
    {
        let (tx, rx) = watch::channel(TelemetryFeed::Waiting);
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();

        let handle = thread::Builder::new()
            .name("telemetry-fetch".to_string())
            .spawn(move || poll_loop(source, policy, interval, tx, flag))?;

        Ok((
            Self {
                shutdown,
                handle: Some(handle),
            },
            rx,
        ))
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Ask the worker to stop after its current request.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Stop and wait for the thread. Blocks for at most one request plus backoff.
    pub fn join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Telemetry worker panicked");
            }
        }
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop<S: TelemetrySource>(
    source: S,
    policy: RetryPolicy,
    interval: Duration,
    tx: watch::Sender<TelemetryFeed>,
    shutdown: Arc<AtomicBool>,
) {
    tracing::debug!(interval_ms = interval.as_millis() as u64, "Telemetry worker started");

    while !shutdown.load(Ordering::SeqCst) {
        match fetch_with_retry(&source, &policy) {
            Ok(payload) => {
                if tx.send(TelemetryFeed::Ready(Arc::new(payload))).is_err() {
                    tracing::debug!("Telemetry receivers dropped, stopping worker");
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Telemetry fetch failed permanently");
                let _ = tx.send(TelemetryFeed::Failed(e.to_string()));
                break;
            }
        }
        thread::sleep(interval);
    }

    tracing::debug!("Telemetry worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::error::FetchError;
    use crate::telemetry::payload::fixtures;
    use std::time::Instant;

    struct Always(bool);

    impl TelemetrySource for Always {
        fn fetch(&self) -> Result<TelemetryPayload, FetchError> {
            if self.0 {
                Ok(fixtures::driving())
            } else {
                Err(FetchError::Status { status: 500 })
            }
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        }
    }

    fn wait_for<F>(rx: &watch::Receiver<TelemetryFeed>, pred: F) -> TelemetryFeed
    where
        F: Fn(&TelemetryFeed) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let feed = rx.borrow().clone();
            if pred(&feed) || Instant::now() > deadline {
                return feed;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn publishes_snapshots_into_the_mailbox() {
        let (worker, rx) =
            FetchWorker::spawn(Always(true), fast_policy(), Duration::from_millis(10)).unwrap();

        let feed = wait_for(&rx, |f| matches!(f, TelemetryFeed::Ready(_)));
        assert_eq!(feed.payload().map(|p| p.truck.speed), Some(72.4));
        worker.join();
    }

    #[test]
    fn publishes_failure_once_and_exits() {
        let (worker, rx) =
            FetchWorker::spawn(Always(false), fast_policy(), Duration::from_millis(10)).unwrap();

        let feed = wait_for(&rx, |f| matches!(f, TelemetryFeed::Failed(_)));
        match feed {
            TelemetryFeed::Failed(msg) => assert!(msg.contains("2 attempts")),
            other => panic!("expected Failed, got {other:?}"),
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while !worker.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(worker.is_finished());
    }

    #[test]
    fn stops_when_receiver_is_dropped() {
        let (worker, rx) =
            FetchWorker::spawn(Always(true), fast_policy(), Duration::from_millis(1)).unwrap();
        drop(rx);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !worker.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(worker.is_finished());
    }
}

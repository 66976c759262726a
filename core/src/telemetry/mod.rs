//! Telemetry acquisition: payload types, retrying fetcher and background worker.

mod error;
mod fetcher;
mod payload;
pub mod worker;

pub use error::FetchError;
pub use fetcher::{
    HttpTelemetrySource, RetryPolicy, TelemetrySource, calculate_backoff, fetch_with_retry,
};
pub use payload::{GameState, JobState, NavigationState, TelemetryPayload, TruckState};
pub use worker::{FetchWorker, TelemetryFeed};

#[cfg(test)]
pub(crate) use payload::fixtures;

//! Error types for telemetry fetching

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("telemetry request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("telemetry endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("telemetry payload could not be decoded")]
    Decode(#[source] serde_json::Error),

    #[error("telemetry unavailable after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

//! Telemetry fetching with bounded exponential backoff.

use std::time::Duration;

use reqwest::blocking::Client;

use super::error::FetchError;
use super::payload::TelemetryPayload;
use crate::context::RetrySettings;

/// Anything that can produce one telemetry snapshot per call.
pub trait TelemetrySource {
    fn fetch(&self) -> Result<TelemetryPayload, FetchError>;
}

/// Blocking HTTP client for the local telemetry server.
pub struct HttpTelemetrySource {
    client: Client,
    url: String,
}

impl HttpTelemetrySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        Ok(Self { client, url })
    }
}

impl TelemetrySource for HttpTelemetrySource {
    fn fetch(&self) -> Result<TelemetryPayload, FetchError> {
        let request_error = |source| FetchError::Request {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(request_error)?;
        TelemetryPayload::from_json(&body).map_err(FetchError::Decode)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Retry
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay, self.max_delay)
    }
}

/// `min(base * 2^attempt, max)` without overflow.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt)).min(max)
}

/// Fetch once, retrying failures until the policy's attempt budget is spent.
pub fn fetch_with_retry<S>(source: &S, policy: &RetryPolicy) -> Result<TelemetryPayload, FetchError>
where
    S: TelemetrySource + ?Sized,
{
    let mut attempt = 0;
    loop {
        match source.fetch() {
            Ok(payload) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Telemetry fetch recovered");
                }
                return Ok(payload);
            }
            Err(err) => {
                let tries = attempt + 1;
                if tries >= policy.max_attempts {
                    tracing::error!(attempts = tries, error = %err, "Giving up on telemetry");
                    return Err(FetchError::Exhausted {
                        attempts: tries,
                        last: Box::new(err),
                    });
                }

                let wait = policy.delay_for(attempt);
                tracing::warn!(
                    error = %err,
                    "api fail: backing off {:.1} seconds after {} tries",
                    wait.as_secs_f64(),
                    tries
                );
                std::thread::sleep(wait);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::payload::fixtures;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then succeeds.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TelemetrySource for Flaky {
        fn fetch(&self) -> Result<TelemetryPayload, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(FetchError::Status { status: 503 })
            } else {
                Ok(fixtures::driving())
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn test_calculate_backoff_doubles_until_cap() {
        let base = Duration::from_millis(500);
        let max = Duration::from_secs(30);
        assert_eq!(calculate_backoff(0, base, max), Duration::from_millis(500));
        assert_eq!(calculate_backoff(1, base, max), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(3, base, max), Duration::from_millis(4000));
        assert_eq!(calculate_backoff(6, base, max), max);
    }

    #[test]
    fn test_calculate_backoff_huge_attempt_saturates() {
        let delay = calculate_backoff(200, Duration::from_secs(1), Duration::from_secs(60));
        assert_eq!(delay, Duration::from_secs(60));
    }

    #[test]
    fn default_policy_matches_settings() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn success_after_fewer_failures_than_budget() {
        let source = Flaky::new(3);
        let payload = fetch_with_retry(&source, &fast_policy(4)).unwrap();
        assert_eq!(payload, fixtures::driving());
        assert_eq!(source.calls(), 4);
    }

    #[test]
    fn exhausts_exactly_at_budget() {
        let source = Flaky::new(u32::MAX);
        let err = fetch_with_retry(&source, &fast_policy(3)).unwrap_err();

        match err {
            FetchError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::Status { status: 503 }));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(source.calls(), 3);
    }

    #[test]
    fn single_attempt_budget_never_sleeps() {
        let source = Flaky::new(1);
        let err = fetch_with_retry(&source, &fast_policy(1)).unwrap_err();
        assert!(matches!(err, FetchError::Exhausted { attempts: 1, .. }));
        assert_eq!(source.calls(), 1);
    }
}

//! Interval gating for periodic work inside the render loop.

use std::time::{Duration, Instant};

/// Fires at most once per `interval`, however often it is polled.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Duration,
    last: Option<Instant>,
}

impl Cadence {
    /// First poll fires immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Treat `now` as the last firing, e.g. after doing the work up front.
    pub fn started_at(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: Some(now),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Make the next poll fire regardless of elapsed time.
    pub fn force(&mut self) {
        self.last = None;
    }
}

/// Fixed-timestep pacing: how long to sleep to hold `frame_rate`.
pub fn frame_budget(frame_rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)))
}

pub fn remaining_in_frame(started: Instant, now: Instant, budget: Duration) -> Duration {
    budget.saturating_sub(now.saturating_duration_since(started))
}

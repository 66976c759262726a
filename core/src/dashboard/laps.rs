//! Delivery advantage sampled once per kilometer.

use std::collections::VecDeque;

use chrono::TimeDelta;

use super::format::hhmm;

pub const LAP_LOG_CAPACITY: usize = 3;

/// Direction of the advantage compared with the previous lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Placeholder seeded into an empty log.
    Start,
    Gaining,
    Losing,
    Steady,
}

impl Trend {
    pub fn glyph(self) -> &'static str {
        match self {
            Trend::Start => "*",
            Trend::Gaining => "↗",
            Trend::Losing => "↘",
            Trend::Steady => "↔",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lap {
    pub trend: Trend,
    /// `HH:MM` of the advantage.
    pub advantage: String,
    /// Signed advantage in seconds.
    pub advantage_secs: i64,
}

impl Lap {
    fn start() -> Self {
        Self {
            trend: Trend::Start,
            advantage: "00:00".to_string(),
            advantage_secs: 0,
        }
    }
}

/// Rolling log of the last few laps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LapLog {
    laps: VecDeque<Lap>,
}

impl Default for LapLog {
    fn default() -> Self {
        Self::new()
    }
}

impl LapLog {
    pub fn new() -> Self {
        let mut laps = VecDeque::with_capacity(LAP_LOG_CAPACITY + 1);
        laps.push_back(Lap::start());
        Self { laps }
    }

    /// Append a lap with `advantage = deadline - estimated arrival`.
    pub fn record(&mut self, advantage: TimeDelta) -> &Lap {
        let secs = advantage.num_seconds();
        let (previous_trend, previous_secs) = self
            .laps
            .back()
            .map(|lap| (lap.trend, lap.advantage_secs))
            .unwrap_or((Trend::Start, 0));

        let trend = if previous_trend == Trend::Start || secs > previous_secs {
            Trend::Gaining
        } else if secs < previous_secs {
            Trend::Losing
        } else {
            Trend::Steady
        };

        self.laps.push_back(Lap {
            trend,
            advantage: hhmm(advantage),
            advantage_secs: secs,
        });
        if self.laps.len() > LAP_LOG_CAPACITY || previous_trend == Trend::Start {
            self.laps.pop_front();
        }

        tracing::debug!(advantage_secs = secs, glyph = trend.glyph(), "Lap recorded");
        // Non-empty: we just pushed.
        &self.laps[self.laps.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lap> {
        self.laps.iter()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    /// True until the first real lap replaces the placeholder.
    #[cfg(test)]
    pub(crate) fn is_pristine(&self) -> bool {
        self.laps.len() == 1 && self.laps[0].trend == Trend::Start
    }
}

/// Detects whole-kilometer crossings of the remaining route distance.
#[derive(Debug, Clone, Default)]
pub struct KilometerTracker {
    last_km: Option<i64>,
}

impl KilometerTracker {
    /// Returns true when the whole-km count differs from the previous observation.
    pub fn crossed(&mut self, distance_m: f64) -> bool {
        let km = (distance_m / 1000.0).floor() as i64;
        let crossed = matches!(self.last_km, Some(prev) if prev != km);
        self.last_km = Some(km);
        crossed
    }

    pub fn reset(&mut self) {
        self.last_km = None;
    }
}

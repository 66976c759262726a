//! Values derived from a telemetry snapshot for display.
//!
//! `Dashboard` turns each payload into six gauge readouts in display order and
//! keeps the little state that spans frames: the last cruise speed that was set
//! and the per-kilometer lap log.

mod format;
mod laps;


use chrono::{TimeDelta, Timelike};

use crate::context::LatenessRule;
use crate::telemetry::TelemetryPayload;

pub use format::{hhmm, whole};
pub use laps::{KilometerTracker, LAP_LOG_CAPACITY, Lap, LapLog, Trend};

// ─────────────────────────────────────────────────────────────────────────────
// Gauge Readouts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GaugeKind {
    Speed,
    SpeedLimit,
    Cruise,
    Fuel,
    RestStop,
    /// Time left until the delivery deadline as `HH:MM` with floor hours.
    /// Once overdue the hours go negative first: 30 minutes late reads
    /// `-1:30`, meaning one hour back plus 30 minutes.
    Job,
}

impl GaugeKind {
    /// Left-to-right display order.
    pub const ALL: [GaugeKind; 6] = [
        GaugeKind::Speed,
        GaugeKind::SpeedLimit,
        GaugeKind::Cruise,
        GaugeKind::Fuel,
        GaugeKind::RestStop,
        GaugeKind::Job,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GaugeKind::Speed => "speed",
            GaugeKind::SpeedLimit => "limit",
            GaugeKind::Cruise => "cruise",
            GaugeKind::Fuel => "fuel",
            GaugeKind::RestStop => "next stop",
            GaugeKind::Job => "remaining",
        }
    }
}

/// Engine speed band, used to color the speed gauge's fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpmBand {
    Low,
    Mid,
    High,
}

impl RpmBand {
    /// `[0, 0.5]` low, `(0.5, 0.7]` mid, above that high.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.7 {
            RpmBand::High
        } else if ratio > 0.5 {
            RpmBand::Mid
        } else {
            RpmBand::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillMode {
    /// Outline only.
    Outline,
    /// Whole box filled with the gauge color.
    Solid,
    /// Filled from the bottom to `ratio` (0..=1) in the band's color.
    Level { ratio: f32, band: RpmBand },
}

impl FillMode {
    fn flag(on: bool) -> Self {
        if on { FillMode::Solid } else { FillMode::Outline }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReadout {
    pub kind: GaugeKind,
    pub value: String,
    pub unit: String,
    pub fill: FillMode,
}

/// Delivery state of the current job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    NoJob,
    Active { remaining: TimeDelta, late: bool },
}

// ─────────────────────────────────────────────────────────────────────────────
// Derivations
// ─────────────────────────────────────────────────────────────────────────────

/// `engineRpm / engineRpmMax`, zero when the maximum is unknown.
pub fn rpm_ratio(payload: &TelemetryPayload) -> f64 {
    let max = payload.truck.engine_rpm_max;
    if max > 0.0 {
        (payload.truck.engine_rpm / max).max(0.0)
    } else {
        0.0
    }
}

pub fn over_limit(payload: &TelemetryPayload) -> bool {
    let limit = payload.navigation.speed_limit;
    limit != 0.0 && payload.truck.speed >= limit
}

pub fn job_status(payload: &TelemetryPayload, rule: LatenessRule) -> JobStatus {
    if !payload.has_job() {
        return JobStatus::NoJob;
    }

    let remaining = payload.job.deadline_time - payload.game.time;
    let late = match rule {
        LatenessRule::Remaining { threshold_minutes } => {
            remaining < TimeDelta::minutes(i64::from(threshold_minutes))
        }
        LatenessRule::Estimate => payload.job.deadline_time < payload.navigation.estimated_time,
    };
    JobStatus::Active { remaining, late }
}

/// Deadline minus navigation estimate; positive means ahead of schedule.
pub fn delivery_advantage(payload: &TelemetryPayload) -> TimeDelta {
    payload.job.deadline_time - payload.navigation.estimated_time
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Dashboard {
    lateness: LatenessRule,
    last_cruise: f64,
    laps: LapLog,
    kilometers: KilometerTracker,
}

impl Dashboard {
    pub fn new(lateness: LatenessRule) -> Self {
        Self {
            lateness,
            last_cruise: 0.0,
            laps: LapLog::new(),
            kilometers: KilometerTracker::default(),
        }
    }

    pub fn laps(&self) -> &LapLog {
        &self.laps
    }

    /// Build this frame's readouts and advance cross-frame state.
    pub fn update(&mut self, payload: &TelemetryPayload) -> [GaugeReadout; 6] {
        let truck = &payload.truck;

        if truck.cruise_control_speed > 0.0 {
            self.last_cruise = truck.cruise_control_speed;
        }

        let ratio = rpm_ratio(payload);
        let speed = GaugeReadout {
            kind: GaugeKind::Speed,
            value: whole(truck.speed),
            unit: "km/h".to_string(),
            fill: FillMode::Level {
                ratio: ratio.clamp(0.0, 1.0) as f32,
                band: RpmBand::from_ratio(ratio),
            },
        };

        let limit = GaugeReadout {
            kind: GaugeKind::SpeedLimit,
            value: whole(payload.navigation.speed_limit),
            unit: "km/h".to_string(),
            fill: FillMode::flag(over_limit(payload)),
        };

        let cruise = GaugeReadout {
            kind: GaugeKind::Cruise,
            value: whole(self.last_cruise),
            unit: "km/h".to_string(),
            fill: FillMode::flag(truck.cruise_control_on),
        };

        let fuel = GaugeReadout {
            kind: GaugeKind::Fuel,
            value: whole(truck.fuel),
            unit: format!("{:.2} l/km", truck.fuel_average_consumption),
            fill: FillMode::flag(truck.fuel_warning_on),
        };

        let rest = payload.game.next_rest_stop_time;
        let rest_stop = GaugeReadout {
            kind: GaugeKind::RestStop,
            value: format!("{:02}:{:02}", rest.hour(), rest.minute()),
            unit: "remaining".to_string(),
            fill: FillMode::flag(rest.hour() < 1),
        };

        let job = match job_status(payload, self.lateness) {
            JobStatus::NoJob => {
                self.kilometers.reset();
                GaugeReadout {
                    kind: GaugeKind::Job,
                    value: "No Job".to_string(),
                    unit: "time".to_string(),
                    fill: FillMode::Outline,
                }
            }
            JobStatus::Active { remaining, late } => {
                if self.kilometers.crossed(payload.navigation.estimated_distance) {
                    self.laps.record(delivery_advantage(payload));
                }
                GaugeReadout {
                    kind: GaugeKind::Job,
                    value: hhmm(remaining),
                    unit: "time".to_string(),
                    fill: FillMode::flag(late),
                }
            }
        };

        [speed, limit, cruise, fuel, rest_stop, job]
    }
}

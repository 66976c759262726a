//! Typed view of the telemetry server's JSON snapshot.
//!
//! Only the fields the overlay reads are modelled; everything else in the
//! document is ignored. A missing field is a decode error.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPayload {
    pub game: GameState,
    pub truck: TruckState,
    pub navigation: NavigationState,
    pub job: JobState,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub paused: bool,
    /// In-game clock.
    pub time: DateTime<Utc>,
    /// Time left until the driver must rest, encoded as an instant on day one.
    pub next_rest_stop_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckState {
    /// km/h
    pub speed: f64,
    pub engine_rpm: f64,
    pub engine_rpm_max: f64,
    /// Litres in the tank.
    pub fuel: f64,
    /// l/km
    pub fuel_average_consumption: f64,
    pub fuel_warning_on: bool,
    pub cruise_control_speed: f64,
    pub cruise_control_on: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    /// km/h, zero when the road has no limit.
    pub speed_limit: f64,
    /// Estimated arrival on the in-game clock.
    pub estimated_time: DateTime<Utc>,
    /// Metres to the destination.
    pub estimated_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    /// Zero when no delivery is active.
    pub income: f64,
    pub deadline_time: DateTime<Utc>,
}

impl TelemetryPayload {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn has_job(&self) -> bool {
        self.job.income != 0.0
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1, 1, day, hour, minute, 0).unwrap()
    }

    /// A truck on the road with an active job.
    pub(crate) fn driving() -> TelemetryPayload {
        TelemetryPayload {
            game: GameState {
                paused: false,
                time: at(1, 10, 0),
                next_rest_stop_time: at(1, 5, 30),
            },
            truck: TruckState {
                speed: 72.4,
                engine_rpm: 1200.0,
                engine_rpm_max: 2500.0,
                fuel: 412.6,
                fuel_average_consumption: 0.337,
                fuel_warning_on: false,
                cruise_control_speed: 0.0,
                cruise_control_on: false,
            },
            navigation: NavigationState {
                speed_limit: 80.0,
                estimated_time: at(1, 14, 0),
                estimated_distance: 250_400.0,
            },
            job: JobState {
                income: 12_500.0,
                deadline_time: at(1, 16, 30),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../tests/fixtures/telemetry.json");

    #[test]
    fn decodes_server_document_ignoring_unknown_fields() {
        let payload = TelemetryPayload::from_json(SAMPLE.as_bytes()).unwrap();

        assert!(!payload.game.paused);
        assert_eq!(payload.truck.engine_rpm_max, 2500.0);
        assert!(payload.truck.cruise_control_on);
        assert_eq!(payload.navigation.speed_limit, 90.0);
        assert_eq!(payload.navigation.estimated_distance, 312_450.0);
        assert_eq!(payload.job.deadline_time, fixtures::at(5, 21, 0));
        assert!(payload.has_job());
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let trimmed = SAMPLE.replace(r#""fuelWarningOn": false"#, r#""fuelWarning": false"#);
        assert!(TelemetryPayload::from_json(trimmed.as_bytes()).is_err());
    }
}

//! Shared configuration types for truckmon
//!
//! This crate contains the serializable configuration that is persisted to disk
//! and consumed by the telemetry core, the overlay renderer, and the binary.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Color Type
// ─────────────────────────────────────────────────────────────────────────────

/// RGB color stored as `[r, g, b]`.
pub type Rgb = [u8; 3];

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "http://localhost:25555/api/ets2/telemetry";
pub const DEFAULT_SERVER_PROCESS: &str = "Ets2Telemetry.exe";
pub const DEFAULT_GAME_TITLES: [&str; 2] = ["Euro Truck Simulator 2", "American Truck Simulator"];

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_server_process() -> String {
    DEFAULT_SERVER_PROCESS.to_string()
}

fn default_game_titles() -> Vec<String> {
    DEFAULT_GAME_TITLES.iter().map(|t| t.to_string()).collect()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_frame_rate() -> u32 {
    30
}

fn default_window_resync_secs() -> u64 {
    10
}

fn default_color_key() -> Rgb {
    [0, 0, 0]
}

// ─────────────────────────────────────────────────────────────────────────────
// Retry Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Backoff parameters for telemetry requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts before the telemetry source is declared unavailable.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Per-request timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_request_timeout_ms() -> u64 {
    2_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lateness
// ─────────────────────────────────────────────────────────────────────────────

/// How a delivery is judged to be running late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LatenessRule {
    /// Late when less than `threshold_minutes` remain before the deadline.
    Remaining {
        #[serde(default = "default_threshold_minutes")]
        threshold_minutes: u32,
    },
    /// Late when the navigation estimate arrives after the deadline.
    Estimate,
}

fn default_threshold_minutes() -> u32 {
    60
}

impl Default for LatenessRule {
    fn default() -> Self {
        LatenessRule::Remaining {
            threshold_minutes: default_threshold_minutes(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Placement and sizing of the gauge strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Horizontal gap between gauges.
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    /// Minimum width of a gauge box.
    #[serde(default = "default_min_width")]
    pub min_width: f32,
    /// Offset of the strip's left edge from the horizontal center of the window.
    #[serde(default = "default_anchor_x_from_center")]
    pub anchor_x_from_center: f32,
    /// Distance of the value row's top edge from the bottom of the window.
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: f32,
    /// Draw the lap advantage readout below the gauges.
    #[serde(default = "default_true")]
    pub show_laps: bool,
}

fn default_font_size() -> f32 {
    18.0
}

fn default_spacing() -> f32 {
    25.0
}

fn default_min_width() -> f32 {
    50.0
}

fn default_anchor_x_from_center() -> f32 {
    -180.0
}

fn default_bottom_margin() -> f32 {
    50.0
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            spacing: default_spacing(),
            min_width: default_min_width(),
            anchor_x_from_center: default_anchor_x_from_center(),
            bottom_margin: default_bottom_margin(),
            show_laps: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Persistent application configuration.
///
/// Loading and saving lives in truckmon-core through the `AppConfigExt` trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Telemetry endpoint returning the JSON snapshot.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Executable name of the local telemetry server.
    #[serde(default = "default_server_process")]
    pub server_process: String,
    /// Refuse to start when the telemetry server process is not running.
    #[serde(default = "default_true")]
    pub require_server_process: bool,
    /// Window titles the overlay follows, tried in order.
    #[serde(default = "default_game_titles")]
    pub game_titles: Vec<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// How often the overlay re-reads the game window geometry.
    #[serde(default = "default_window_resync_secs")]
    pub window_resync_secs: u64,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub lateness: LatenessRule,
    #[serde(default)]
    pub layout: LayoutSettings,
    /// Pixels of exactly this color are fully transparent.
    #[serde(default = "default_color_key")]
    pub color_key: Rgb,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            server_process: default_server_process(),
            require_server_process: true,
            game_titles: default_game_titles(),
            poll_interval_ms: default_poll_interval_ms(),
            frame_rate: default_frame_rate(),
            window_resync_secs: default_window_resync_secs(),
            retry: RetrySettings::default(),
            lateness: LatenessRule::default(),
            layout: LayoutSettings::default(),
            color_key: default_color_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.layout.font_size, 18.0);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            frame_rate = 60

            [layout]
            spacing = 40.0

            [lateness]
            rule = "estimate"
            "#,
        )
        .unwrap();

        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.layout.spacing, 40.0);
        assert_eq!(config.layout.min_width, 50.0);
        assert_eq!(config.lateness, LatenessRule::Estimate);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn remaining_rule_threshold_defaults_to_an_hour() {
        let config: AppConfig = toml::from_str("[lateness]\nrule = \"remaining\"\n").unwrap();
        assert_eq!(
            config.lateness,
            LatenessRule::Remaining {
                threshold_minutes: 60
            }
        );
    }
}

//! Application configuration
//!
//! This module re-exports shared types from truckmon-types and provides
//! persistence and validation for AppConfig.

use std::path::{Path, PathBuf};

use super::error::ConfigError;

// Re-export all shared types
pub use truckmon_types::{AppConfig, LatenessRule, LayoutSettings, RetrySettings, Rgb};

pub const APP_NAME: &str = "truckmon";
pub const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    /// Load from the default location, falling back to defaults on any error.
    fn load() -> Self;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn save_to(&self, path: &Path) -> Result<(), ConfigError>;
    fn config_path() -> Option<PathBuf>;
    /// Reject values the overlay cannot run with.
    fn validate(&self) -> Result<(), ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        confy::load(APP_NAME, CONFIG_NAME).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        confy::load_path(path).map_err(|source| ConfigError::LoadPath {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(invalid("api_url", "must not be empty"));
        }
        if self.game_titles.is_empty() {
            return Err(invalid("game_titles", "at least one window title is required"));
        }
        if self.frame_rate == 0 {
            return Err(invalid("frame_rate", "must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(invalid(
                "retry.base_delay_ms",
                format!("exceeds retry.max_delay_ms ({})", self.retry.max_delay_ms),
            ));
        }
        if self.layout.font_size.is_nan() || self.layout.font_size <= 0.0 {
            return Err(invalid("layout.font_size", "must be positive"));
        }
        if self.layout.spacing < 0.0 || self.layout.min_width < 0.0 {
            return Err(invalid("layout", "spacing and min_width must not be negative"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

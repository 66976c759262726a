use thiserror::Error;
use truckmon_core::{ConfigError, FetchError};
use truckmon_overlay::PlatformError;

/// Startup and run-time failures of the overlay binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Telemetry Server process not detected ({process})")]
    ServerNotRunning { process: String },

    #[error("Unable to fetch telemetry. Make sure the server is running first. ({0})")]
    TelemetryUnavailable(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create overlay window: {0}")]
    Window(#[from] PlatformError),

    #[error("Failed to set up telemetry client: {0}")]
    Client(#[from] FetchError),

    #[error("Failed to start background thread: {0}")]
    Thread(#[from] std::io::Error),
}

impl AppError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::ServerNotRunning { .. } => 1,
            AppError::TelemetryUnavailable(_) => 2,
            AppError::Config(_) | AppError::Window(_) | AppError::Client(_) | AppError::Thread(_) => 3,
        }
    }
}

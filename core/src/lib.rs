pub mod cadence;
pub mod context;
pub mod dashboard;
pub mod frame_gate;
pub mod process;
pub mod telemetry;

// Re-exports for convenience
pub use cadence::Cadence;
pub use context::{AppConfig, AppConfigExt, ConfigError};
pub use dashboard::{Dashboard, FillMode, GaugeKind, GaugeReadout, LapLog, RpmBand, Trend};
pub use frame_gate::{FrameDecision, FrameInputs, LoopState, SkipReason};
pub use process::is_process_running;
pub use telemetry::{
    FetchError, FetchWorker, HttpTelemetrySource, RetryPolicy, TelemetryFeed, TelemetryPayload,
    TelemetrySource,
};

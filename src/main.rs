mod app;
mod cli;
mod console;
mod error;
mod logging;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use truckmon_core::{
    AppConfig, AppConfigExt, FetchWorker, HttpTelemetrySource, RetryPolicy, is_process_running,
};
use truckmon_overlay::NativeDesktop;

use crate::app::OverlayApp;
use crate::cli::Args;
use crate::error::AppError;

/// Console commands buffered between frames.
const COMMAND_BUFFER: usize = 16;

fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = logging::init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, code = err.exit_code(), "Truckmon exiting");
            eprintln!("Truckmon Exiting! {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn load_config(args: &Args) -> Result<AppConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = load_config(args)?;

    if args.write_default_config {
        match &args.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        let path = args.config.clone().or_else(AppConfig::config_path);
        let shown = path.map(|p| p.display().to_string()).unwrap_or_default();
        println!("Wrote configuration to {shown}");
        return Ok(());
    }

    if config.require_server_process && !is_process_running(&config.server_process) {
        return Err(AppError::ServerNotRunning {
            process: config.server_process.clone(),
        });
    }

    let source = HttpTelemetrySource::new(
        config.api_url.as_str(),
        Duration::from_millis(config.retry.request_timeout_ms),
    )?;
    let (worker, feed) = FetchWorker::spawn(
        source,
        RetryPolicy::from(&config.retry),
        Duration::from_millis(config.poll_interval_ms),
    )?;
    tracing::info!(api_url = %config.api_url, "Telemetry worker started");

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    // Detached: blocks on stdin until EOF or `quit`
    console::spawn(command_tx)?;
    tracing::info!("Truckmon is running. Type `hide`, `show`, `toggle`, `resync` or `quit`");

    let desktop = NativeDesktop::connect()?;
    let result = OverlayApp::new(config, desktop, feed, command_rx).and_then(OverlayApp::run);

    // A worker mid-backoff is left to die with the process
    worker.stop();
    if worker.is_finished() {
        worker.join();
    }
    result
}

use std::path::PathBuf;

use clap::Parser;
use truckmon_core::AppConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Transparent telemetry gauges over Euro Truck Simulator 2")]
pub struct Args {
    /// Load configuration from this TOML file instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Telemetry endpoint, overriding the configured one
    #[arg(long)]
    pub api_url: Option<String>,

    /// Start even when the telemetry server process is not running
    #[arg(long)]
    pub skip_process_check: bool,

    /// Telemetry poll interval in milliseconds
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Write the effective configuration and exit
    #[arg(long)]
    pub write_default_config: bool,
}

impl Args {
    /// Layer command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(ms) = self.poll_ms {
            config.poll_interval_ms = ms;
        }
        if self.skip_process_check {
            config.require_server_process = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let args = Args::try_parse_from([
            "truckmon",
            "--api-url",
            "http://10.0.0.5:25555/api/ets2/telemetry",
            "--poll-ms",
            "250",
            "--skip-process-check",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.api_url, "http://10.0.0.5:25555/api/ets2/telemetry");
        assert_eq!(config.poll_interval_ms, 250);
        assert!(!config.require_server_process);
    }

    #[test]
    fn no_flags_keep_config() {
        let args = Args::try_parse_from(["truckmon"]).unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn config_path_flag() {
        let args = Args::try_parse_from(["truckmon", "-c", "/tmp/truckmon.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/truckmon.toml")));
    }
}

mod config;
mod error;

pub use config::{
    APP_NAME, AppConfig, AppConfigExt, CONFIG_NAME, LatenessRule, LayoutSettings, RetrySettings,
    Rgb,
};
pub use error::ConfigError;

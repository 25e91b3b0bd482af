// config.rs

use crate::cli::Args;
use crate::handler::HandlerOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use log::{debug, LevelFilter};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "midikeyrs";
pub const ENV_PREFIX: &str = "MIDIKEYRS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Source(#[from] config::ConfigError),
    #[error("poll_interval_ms must be at least 1, got {0}")]
    InvalidPollInterval(i64),
    #[error("unknown log_level '{0}'")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Hot-plug polling and event dispatch on/off
    pub enabled: bool,
    pub poll_interval_ms: u64,
    /// Client name announced to the MIDI driver
    pub client_name: String,
    pub log_level: LevelFilter,
}

impl Settings {
    /// Built-in defaults, the lowest-priority source
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
        Ok(Config::builder()
            .set_default("enabled", true)?
            .set_default("poll_interval_ms", 500)?
            .set_default("client_name", "midikeyrs")?
            .set_default("log_level", "info")?)
    }

    /// Defaults, then the optional config file, then `MIDIKEYRS_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Self::defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self, SettingsError> {
        let poll_interval = config.get_int("poll_interval_ms")?;
        if poll_interval < 1 {
            return Err(SettingsError::InvalidPollInterval(poll_interval));
        }

        let level = config.get_string("log_level")?;
        let log_level = level
            .parse::<LevelFilter>()
            .map_err(|_| SettingsError::InvalidLogLevel(level.clone()))?;

        let settings = Settings {
            enabled: config.get_bool("enabled")?,
            poll_interval_ms: poll_interval as u64,
            client_name: config.get_string("client_name")?,
            log_level,
        };
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Command-line flags override every other source
    pub fn apply_args(&mut self, args: &Args) -> Result<(), SettingsError> {
        if args.disabled {
            self.enabled = false;
        }
        if let Some(ms) = args.poll_interval_ms {
            if ms == 0 {
                return Err(SettingsError::InvalidPollInterval(0));
            }
            self.poll_interval_ms = ms;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            enabled: self.enabled,
            poll_interval: self.poll_interval(),
        }
    }
}

//! Handles settings for the application.
//!
//! Values are read from an optional `settings.toml` and can be overridden
//! with `SPARTIAMO_*` environment variables, using `__` between nested keys
//! (e.g. `SPARTIAMO_TELEGRAM__TOKEN`).
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const SETTINGS_FILE: &str = "settings";
const ENV_PREFIX: &str = "SPARTIAMO";
/// Ten years, longer intervals are clamped.
const MAX_SWEEP_INTERVAL_HOURS: u64 = 10 * 365 * 24;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sessions {
    pub ttl_days: u32,
    pub sweep_interval_hours: u64,
    pub snapshot_path: String,
}

impl Default for Sessions {
    fn default() -> Self {
        Self {
            ttl_days: 120,
            sweep_interval_hours: 24,
            snapshot_path: "./snapshot.json".to_string(),
        }
    }
}

impl Sessions {
    /// Interval between two sweeps of expired sessions, clamped to
    /// [`MAX_SWEEP_INTERVAL_HOURS`].
    pub fn sweep_interval(&self) -> Duration {
        let hours = self.sweep_interval_hours.min(MAX_SWEEP_INTERVAL_HOURS);
        Duration::from_secs(hours * 60 * 60)
    }
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub sessions: Sessions,
    pub telegram: Option<Telegram>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(SETTINGS_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("telegram.allowed_users")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

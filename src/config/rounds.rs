//! Application configuration loading from config.toml
//!
//! The file names the database, the projection lookback, the optional
//! materializer tick, and the round types to seed on startup. Seeding is
//! idempotent, so the same file can be applied on every boot.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "ROUND_KEEPER_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Database URL; falls back to `DATABASE_URL` when absent
    #[serde(default)]
    pub database_url: Option<String>,
    /// How far back the status timeline reaches, in hours
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,
    /// When set, materialize on this interval instead of running once
    #[serde(default)]
    pub tick_seconds: Option<u64>,
    /// Round types to seed
    #[serde(default)]
    pub round_types: Vec<RoundTypeConfig>,
}

/// Configuration for a single round type and its roster
#[derive(Debug, Deserialize, Clone)]
pub struct RoundTypeConfig {
    /// Display name, also used to match an existing round type
    pub name: String,
    /// Length of one step
    pub duration_amount: i32,
    /// Unit of `duration_amount`
    #[serde(default = "default_duration_unit")]
    pub duration_unit: String,
    /// Whether the cadence participates in materialization
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Patients on this cadence's roster
    #[serde(default)]
    pub patients: Vec<String>,
}

const fn default_lookback_hours() -> i64 {
    12
}

fn default_duration_unit() -> String {
    crate::core::round_type::MINUTES.to_string()
}

const fn default_enabled() -> bool {
    true
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
/// - `lookback_hours` is not positive
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.lookback_hours <= 0 {
        return Err(Error::Config {
            message: format!(
                "lookback_hours must be positive, got {}",
                config.lookback_hours
            ),
        });
    }

    Ok(config)
}

/// Loads the configuration from `ROUND_KEEPER_CONFIG`, or ./config.toml
pub fn load_default_config() -> Result<AppConfig> {
    let path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

//! Application settings loaded from config.toml with environment overrides.
//!
//! The config file is optional: a missing file yields defaults, and
//! `DATABASE_URL` in the environment always wins over the file value.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Application configuration for the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database connection string
    pub database_url: String,
    /// Upper bound on instances a single recurrence expansion may produce
    pub max_batch_instances: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/lessonledger.sqlite".to_string(),
            max_batch_instances: crate::core::recurrence::DEFAULT_MAX_INSTANCES,
        }
    }
}

/// Loads configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration: ./config.toml if present, defaults
/// otherwise, with `DATABASE_URL` from the environment taking precedence.
pub fn load_app_configuration() -> Result<AppConfig> {
    let mut config = if Path::new("config.toml").exists() {
        load_config("config.toml")?
    } else {
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }
    Ok(config)
}

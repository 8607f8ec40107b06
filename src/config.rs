//! # Engine Configuration
//!
//! Layered configuration: compiled defaults, then an optional TOML file
//! (`config/riego.toml`, plus an environment-specific overlay), then
//! `RIEGO_`-prefixed environment variables. The last source wins.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::EVENT_CHANNEL_CAPACITY;

/// HTTP surface settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Event publisher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: EVENT_CHANNEL_CAPACITY,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub environment: String,
    pub web: WebConfig,
    pub events: EventConfig,
}

impl EngineConfig {
    /// Load configuration from layered sources.
    ///
    /// `RIEGO_ENV` selects the environment overlay file; nested keys use a
    /// double underscore in environment variables
    /// (`RIEGO_WEB__BIND_ADDRESS=0.0.0.0:8080`).
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("RIEGO_ENV").unwrap_or_else(|_| "development".to_string());

        Config::builder()
            .set_default("environment", environment.clone())?
            .add_source(File::with_name("config/riego").required(false))
            .add_source(File::with_name(&format!("config/riego.{environment}")).required(false))
            .add_source(Environment::with_prefix("RIEGO").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.web.bind_address, "127.0.0.1:3000");
        assert_eq!(config.events.channel_capacity, EVENT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let config = EngineConfig::load().unwrap();
        assert_eq!(config.events.channel_capacity, EVENT_CHANNEL_CAPACITY);
        assert!(!config.environment.is_empty());
    }
}

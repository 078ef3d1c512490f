use crate::common::error::{Result, ScrubberError};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub hubspot: HubSpotConfig,
    pub reference: ReferenceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct HubSpotConfig {
    pub base_url: String,
    pub batch_size: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReferenceConfig {
    pub cities_path: String,
    pub dial_codes_path: String,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub snapshot_dir: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ScrubberError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Bearer token for the CRM API, taken from the environment.
    pub fn api_token() -> Result<String> {
        Ok(std::env::var("HUBSPOT_TOKEN")?)
    }
}

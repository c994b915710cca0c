//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the token authority's base URL and the keyring service
//! name entries are scoped under.
//!
//! Configuration is stored at `~/.config/authgate/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::keychain::DEFAULT_SERVICE;

/// Application name used for config directory paths
const APP_NAME: &str = "authgate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token authority the client talks to unless configured otherwise
const DEFAULT_API_BASE_URL: &str = "https://playground.nordsec.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_keychain_service")]
    pub keychain_service: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_keychain_service() -> String {
    DEFAULT_SERVICE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            keychain_service: default_keychain_service(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.keychain_service, DEFAULT_SERVICE);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);

        let config: Config =
            serde_json::from_str(r#"{"api_base_url":"http://localhost:8080"}"#).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.keychain_service, DEFAULT_SERVICE);
    }
}

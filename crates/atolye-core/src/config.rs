//! Application configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! selects the backend instance to talk to and remembers the last used
//! username.
//!
//! Configuration is stored at `~/.config/atolye/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "atolye";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable naming the backend instance to use
const API_URL_ENV: &str = "ATOLYE_API_URL";

/// Fallback backend instance when nothing else is configured
const DEFAULT_API_URL: &str = "https://repairserviceapi-2.onrender.com";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Pick up a .env file if one is present, as the deployments do
        let _ = dotenvy::dotenv();

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

    /// Resolve the backend base URL.
    ///
    /// An explicit config value wins, then the `ATOLYE_API_URL` environment
    /// variable, then the hardcoded fallback instance.
    pub fn api_url(&self) -> String {
        if let Some(ref url) = self.api_url {
            if !url.is_empty() {
                return normalize_url(url);
            }
        }
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                return normalize_url(&url);
            }
        }
        DEFAULT_API_URL.to_string()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session file
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

/// Strip trailing slashes so endpoint paths can be appended uniformly
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

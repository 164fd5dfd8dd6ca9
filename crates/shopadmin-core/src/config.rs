//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the last used login email and the admin
//! check policy.
//!
//! Configuration is stored at `~/.config/shopadmin/config.json`. The stored
//! session lives next to it in `admin_user.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::AdminCheck;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "shopadmin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API used when neither the environment nor the config names one
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment override for the API base URL
pub const API_URL_ENV: &str = "SHOPADMIN_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
    /// Accept the admin flag cached with the session instead of asking the
    /// server on every command
    #[serde(default)]
    pub trust_cached_admin: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
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
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Directory holding the config and the stored session
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME))
    }

    /// Directory for log files
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// API base URL: environment, then config, then the local default
    pub fn api_url(&self) -> String {
        let from_env = std::env::var(API_URL_ENV).ok();
        Self::resolve_api_url(from_env.as_deref(), self.api_url.as_deref())
    }

    fn resolve_api_url(from_env: Option<&str>, from_config: Option<&str>) -> String {
        from_env
            .filter(|u| !u.trim().is_empty())
            .or_else(|| from_config.filter(|u| !u.trim().is_empty()))
            .unwrap_or(DEFAULT_API_URL)
            .trim()
            .trim_end_matches('/')
            .to_string()
    }

    pub fn admin_check(&self) -> AdminCheck {
        if self.trust_cached_admin {
            AdminCheck::TrustCachedClaim
        } else {
            AdminCheck::VerifyWithServer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_precedence() {
        assert_eq!(
            Config::resolve_api_url(Some("https://env.example/"), Some("https://cfg.example")),
            "https://env.example"
        );
        assert_eq!(
            Config::resolve_api_url(Some("  "), Some("https://cfg.example")),
            "https://cfg.example"
        );
        assert_eq!(Config::resolve_api_url(None, None), DEFAULT_API_URL);
    }

    #[test]
    fn test_admin_check_policy() {
        assert_eq!(Config::default().admin_check(), AdminCheck::VerifyWithServer);
        let config: Config = serde_json::from_str(r#"{"trust_cached_admin": true}"#).unwrap();
        assert_eq!(config.admin_check(), AdminCheck::TrustCachedClaim);
    }
}

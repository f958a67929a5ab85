//! Application configuration management.
//!
//! Holds the cache version tag, the asset manifest, the page base URL, and
//! the weekly reset schedule.
//!
//! Configuration is stored at `~/.config/pagekit/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::assets::AssetManifest;
use crate::reset::ResetSchedule;

/// Application name used for config/data directory paths
const APP_NAME: &str = "pagekit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// File holding the page's key-value state inside the data directory
const STORE_FILE: &str = "local_storage.json";

/// Directory holding named asset caches inside the data directory
const CACHES_DIR: &str = "caches";

/// Version tag of the asset manifest shipped by default
const DEFAULT_VERSION_TAG: &str = "wr-treino-v1";

/// Base URL the manifest resolves against by default
const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version_tag: String,
    pub base_url: String,
    pub manifest: AssetManifest,
    pub reset: ResetSchedule,
    pub data_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version_tag: DEFAULT_VERSION_TAG.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            manifest: AssetManifest::default(),
            reset: ResetSchedule::default(),
            data_dir: None,
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            config.validate()?;
            Ok(config)
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

    pub fn validate(&self) -> Result<()> {
        if self.version_tag.trim().is_empty() {
            anyhow::bail!("version_tag must not be empty");
        }
        if !self.reset.is_valid() {
            anyhow::bail!("reset hour must be between 0 and 23, got {}", self.reset.hour);
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("Invalid base_url {:?}", self.base_url))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(STORE_FILE))
    }

    pub fn caches_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(CACHES_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"version_tag":"wr-treino-v2"}"#).unwrap();
        assert_eq!(config.version_tag, "wr-treino-v2");
        assert_eq!(config.manifest, AssetManifest::default());
        assert_eq!(config.reset, ResetSchedule::new(Weekday::Sun, 22));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.reset.hour = 25;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.version_tag = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_paths_under_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/pagekit-test")),
            ..Config::default()
        };
        assert_eq!(config.store_path().unwrap(), PathBuf::from("/tmp/pagekit-test/local_storage.json"));
        assert_eq!(config.caches_dir().unwrap(), PathBuf::from("/tmp/pagekit-test/caches"));
    }
}

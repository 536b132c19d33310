//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the token storage backend and the last
//! used login email.
//!
//! Configuration is stored at `~/.config/blogdesk/config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{FileTokenStorage, KeyringTokenStorage, TokenStorage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "blogdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API served by a local backend on its default port
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `session.json` in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub storage: StorageBackend,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Token storage for the configured backend
    pub fn token_storage(&self) -> Result<Arc<dyn TokenStorage>> {
        Ok(match self.storage {
            StorageBackend::File => Arc::new(FileTokenStorage::in_dir(&self.cache_dir()?)),
            StorageBackend::Keyring => Arc::new(KeyringTokenStorage::new()),
        })
    }
}

//! Zukii configuration management
//! Handles loading and saving the config file

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::DEFAULT_API_BASE;
use crate::website::DEFAULT_EMBED_SCRIPT_URL;

/// Zukii configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Backend API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Local state database path
    #[serde(default = "default_db_path")]
    pub database_path: String,

    /// Polling settings
    #[serde(default)]
    pub polling: PollingConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Script URL used in placeholder embed snippets
    #[serde(default = "default_embed_script_url")]
    pub embed_script_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_db_path() -> String {
    "~/.zukii/zukii.db".to_string()
}

fn default_embed_script_url() -> String {
    DEFAULT_EMBED_SCRIPT_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            database_path: default_db_path(),
            polling: PollingConfig::default(),
            http: HttpConfig::default(),
            embed_script_url: default_embed_script_url(),
        }
    }
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Stop polling a website after this many ticks (unset: never)
    #[serde(default)]
    pub max_ticks: Option<u32>,
}

fn default_interval_secs() -> u64 {
    5
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_ticks: None,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Config {
    /// Load config from the default location or specified path
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = Self::config_path(path)?;

        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&raw).context("Failed to parse config file")?;

        debug!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = Self::config_path(path)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(&self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        info!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Get the config file path
    pub fn config_path(path: Option<&str>) -> Result<PathBuf> {
        if let Some(p) = path {
            return Ok(PathBuf::from(p));
        }

        if let Ok(env_path) = std::env::var("ZUKII_CONFIG") {
            return Ok(PathBuf::from(env_path));
        }

        let home = dirs::home_dir().context("Cannot find home directory")?;
        Ok(home.join(".zukii").join("config.yml"))
    }

    /// Resolve database path (expand ~)
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        if !self.database_path.starts_with('~') {
            return Ok(PathBuf::from(&self.database_path));
        }

        let home = dirs::home_dir().context("Cannot find home directory")?;
        let path = self
            .database_path
            .replacen('~', &home.to_string_lossy(), 1);
        Ok(PathBuf::from(path))
    }
}

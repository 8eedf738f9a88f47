// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::DiskStore;
use anyhow::{Error, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

/// Environment variable that overrides `api_url` from the config file.
pub const API_URL_ENV: &str = "TASKBOARD_API_URL";

pub const DEFAULT_PAGE_SIZE: u32 = 10;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Base URL of the task API, e.g. `https://tasks.example.com/api`.
    #[serde(default)]
    pub api_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            // Match the serde defaults
            page_size: DEFAULT_PAGE_SIZE,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        // Explicitly detect missing file so callers (onboarding) can behave accordingly.
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let mut config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        if config.page_size == 0 {
            config.page_size = DEFAULT_PAGE_SIZE;
        }
        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies `TASKBOARD_API_URL` when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.api_url = url.to_string();
            }
        }
    }

    /// Helper to detect whether an anyhow::Error indicates that the config file was missing.
    ///  - Fast path: check for our explicit "Config file not found" message
    ///  - Look for underlying IO NotFound errors in the error chain
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        DiskStore::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            DiskStore::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Get the path string using an explicit context.
    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }

    /// Unknown level names fall back to `Info`.
    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

//! HUD configuration.
//!
//! Read once at startup from `config.json` in the platform config directory
//! (`~/.config/codehud` on Linux). A missing file means defaults. Relative
//! credential and token paths resolve against the same directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub weather_api_key: String,
    pub weather_location: String,
    pub weather_base_url: String,
    pub calendar_base_url: String,
    pub refresh_interval_secs: u64,
    pub tick_rate_hz: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub toggle_key: char,
    pub credentials_file: PathBuf,
    pub token_file: PathBuf,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            weather_api_key: "YOUR_OPENWEATHERMAP_API_KEY".to_string(),
            weather_location: "Indianapolis, US".to_string(),
            weather_base_url: "https://api.openweathermap.org".to_string(),
            calendar_base_url: "https://www.googleapis.com".to_string(),
            refresh_interval_secs: 1800,
            tick_rate_hz: 60,
            window_width: 800,
            window_height: 600,
            toggle_key: 't',
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
        }
    }
}

impl HudConfig {
    /// The platform config directory (`~/.config/codehud`, `%APPDATA%\codehud`, ...).
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("dev", "codehud", "codehud")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the platform config directory.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = Self::config_dir()?;
        Self::load_from(&dir)
    }

    /// Load `config.json` from `dir`, falling back to defaults when absent.
    /// Credential paths are resolved against `dir`.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str::<HudConfig>(&raw)
                .map_err(|source| ConfigError::Parse { path: path.clone(), source })?
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            HudConfig::default()
        };

        config.resolve_paths(dir);
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, dir: &Path) {
        if self.credentials_file.is_relative() {
            self.credentials_file = dir.join(&self.credentials_file);
        }
        if self.token_file.is_relative() {
            self.token_file = dir.join(&self.token_file);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_secs must be positive".into(),
            ));
        }
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err(ConfigError::Invalid(format!(
                "tick_rate_hz must be within 1..=1000, got {}",
                self.tick_rate_hz
            )));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        if self.toggle_key.is_control() {
            return Err(ConfigError::Invalid(
                "toggle_key must be a printable character".into(),
            ));
        }
        Ok(())
    }

    /// Duration of one render tick.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "amplipi-tui";

/// Overrides `api.url` when set.
pub const URL_ENV: &str = "AMPLIPI_URL";

/// Polling faster than this only loads the device.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub poll: PollConfig,
    pub volume: VolumeConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Fraction of full scale moved per key press.
    pub step: f64,
    /// How long a volume request may stay unanswered before the next gesture
    /// is sent anyway.
    pub stale_after_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://amplipi.local".to_string(),
            timeout_ms: 3000,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            step: 0.05,
            stale_after_ms: 5000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl VolumeConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

impl Config {
    /// Read the config file, writing the defaults first if it does not exist,
    /// then apply the environment override.
    pub fn load() -> Result<Self> {
        let config_path = config_file()?;
        let config = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            Self::parse(&content)?
        } else {
            let config = Self::default();
            config.save()?;
            config
        };

        Ok(config.with_url_override(std::env::var(URL_ENV).ok()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config file")?;
        config.validate().context("Invalid config file")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_ms == 0 {
            bail!("api.timeout_ms must be greater than 0");
        }
        if self.poll.interval_ms < MIN_POLL_INTERVAL_MS {
            bail!(
                "poll.interval_ms must be at least {}, got {}",
                MIN_POLL_INTERVAL_MS,
                self.poll.interval_ms
            );
        }
        if !(self.volume.step > 0.0 && self.volume.step <= 1.0) {
            bail!("volume.step must be in (0, 1], got {}", self.volume.step);
        }
        if self.volume.stale_after_ms == 0 {
            bail!("volume.stale_after_ms must be greater than 0");
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = config_file()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn with_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            self.api.url = url;
        }
        self
    }
}

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .context("Unable to determine config directory")
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::data_dir() {
        return Ok(dir.join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".local").join("share").join(APP_DIR));
    }
    Err(anyhow!("Unable to determine data directory"))
}

pub fn log_file() -> Result<PathBuf> {
    Ok(data_dir()?.join("amplipi-tui.log"))
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tubeline::Settings;
use tubeline::queue::beanstalk::DEFAULT_PORT;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tube: Option<String>,
    pub priority: Option<u32>,
    pub delay: Option<u32>,
    pub ttr: Option<u32>,
    pub log_level: Option<String>,
}

impl Config {
    /// Defaults, overlaid by the config file if there is one, overlaid by
    /// `TUBELINE_*` environment variables.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Ok(path) if path.exists() => Self::load_from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Override fields from environment-style variables. Numbers that do not
    /// parse are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("TUBELINE_HOST") {
            self.host = Some(host);
        }

        if let Some(port) = lookup("TUBELINE_PORT").and_then(|v| v.parse().ok()) {
            self.port = Some(port);
        }

        if let Some(tube) = lookup("TUBELINE_TUBE") {
            self.tube = Some(tube);
        }

        if let Some(priority) = lookup("TUBELINE_PRIORITY").and_then(|v| v.parse().ok()) {
            self.priority = Some(priority);
        }

        if let Some(delay) = lookup("TUBELINE_DELAY").and_then(|v| v.parse().ok()) {
            self.delay = Some(delay);
        }

        if let Some(ttr) = lookup("TUBELINE_TTR").and_then(|v| v.parse().ok()) {
            self.ttr = Some(ttr);
        }

        if let Some(log_level) = lookup("TUBELINE_LOG_LEVEL") {
            self.log_level = Some(log_level);
        }
    }

    /// Command-line flags win over everything else.
    pub fn override_address(&mut self, host: Option<String>, port: Option<u16>) {
        if host.is_some() {
            self.host = host;
        }
        if port.is_some() {
            self.port = port;
        }
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Cannot find config directory"))?;

        path.push("tubeline");
        path.push("config.toml");
        Ok(path)
    }

    pub fn get_host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn get_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.get_host(), self.get_port())
    }

    pub fn get_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Session settings: the built-in defaults with any configured values on top.
    pub fn initial_settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(tube) = self.tube.as_deref().filter(|t| !t.is_empty()) {
            settings.set_tube(tube);
        }
        if let Some(priority) = self.priority {
            settings.set_priority(priority);
        }
        if let Some(delay) = self.delay {
            settings.set_delay(delay);
        }
        if let Some(ttr) = self.ttr {
            settings.set_ttr(ttr);
        }
        settings
    }
}

/// Level named by a config value such as `debug` or `WARN`, or `None` when it
/// names no level.
pub fn parse_log_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}

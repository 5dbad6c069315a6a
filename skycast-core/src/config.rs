use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Fixed production weather service (HTTP API + push channel, same host).
pub const DEFAULT_SERVICE_URL: &str = "https://live-weather-app-backend-1.onrender.com";

/// Fixed icon image host; icons are fetched as `{base}/{code}.png`.
pub const DEFAULT_ICON_URL: &str = "http://openweathermap.org/img/w";

/// Top-level configuration stored on disk.
///
/// The whole configuration surface is the two endpoint hosts; everything
/// else about the panel is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the weather service, serving both `/api/weather` and
    /// the `/api/weather/events` push channel.
    pub service_url: String,

    /// Base URL of the icon image host.
    pub icon_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            icon_url: DEFAULT_ICON_URL.to_string(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the built-in defaults if the file
    /// doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use the fixed hosts.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// URL of the one-shot weather endpoint.
    pub fn weather_endpoint(&self) -> String {
        format!("{}/api/weather", self.service_url.trim_end_matches('/'))
    }

    /// URL of the push-channel endpoint.
    pub fn events_endpoint(&self) -> String {
        format!("{}/api/weather/events", self.service_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_fixed_hosts() {
        let cfg = Config::default();

        assert_eq!(cfg.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(cfg.icon_url, DEFAULT_ICON_URL);
    }

    #[test]
    fn endpoints_derive_from_service_url() {
        let cfg = Config { service_url: "http://localhost:9000/".into(), ..Config::default() };

        assert_eq!(cfg.weather_endpoint(), "http://localhost:9000/api/weather");
        assert_eq!(cfg.events_endpoint(), "http://localhost:9000/api/weather/events");
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config {
            service_url: "http://example.com".into(),
            icon_url: "http://icons.example.com".into(),
        };

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");

        assert_eq!(parsed.service_url, cfg.service_url);
        assert_eq!(parsed.icon_url, cfg.icon_url);
    }
}

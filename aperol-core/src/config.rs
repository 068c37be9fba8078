use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::classify::{DrinkScorePolicy, DrinkStyle};

pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json/";

/// How the caller's position is obtained when no fixed location is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// Look the position up from the public IP address.
    #[default]
    Ip,
    /// No geolocation; a fixed location must be given.
    Off,
}

/// A location pinned in config or on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedLocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Service base URLs. Overridable so tests and mirrors can point elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocode_url: String,
    pub forecast_url: String,
    pub ip_lookup_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// drink_score = "weather_code"
/// hourly = false
///
/// [location]
/// latitude = 52.52
/// longitude = 13.41
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub drink_score: DrinkScorePolicy,
    pub drink_style: DrinkStyle,
    /// Request and show the hourly strip.
    pub hourly: bool,
    /// Request and show UV lines.
    pub uv: bool,
    /// Language for place names, sent as `accept-language`.
    pub language: String,
    pub geolocation: GeolocationMode,
    pub location: Option<FixedLocationConfig>,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            drink_score: DrinkScorePolicy::default(),
            drink_style: DrinkStyle::default(),
            hourly: true,
            uv: true,
            language: "en".to_string(),
            geolocation: GeolocationMode::default(),
            location: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "aperol", "aperol")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_location(&mut self, latitude: f64, longitude: f64) {
        self.location = Some(FixedLocationConfig { latitude, longitude });
    }

    pub fn clear_location(&mut self) {
        self.location = None;
    }
}

use crate::{
    Config, Coordinates, WeatherSnapshot, error::Result, provider::open_meteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, coords: Coordinates) -> Result<WeatherSnapshot>;
}

/// Which optional columns a forecast request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastFields {
    pub hourly: bool,
    pub uv: bool,
}

impl Default for ForecastFields {
    fn default() -> Self {
        Self { hourly: true, uv: true }
    }
}

impl ForecastFields {
    pub fn from_config(config: &Config) -> Self {
        Self { hourly: config.hourly, uv: config.uv }
    }

    /// Value for the `hourly` query parameter, if any hourly data is wanted.
    /// The current UV reading comes from the hourly `uv_index` column, so it
    /// is requested whenever UV is on, with or without the strip.
    pub fn hourly_param(&self) -> Option<String> {
        let mut fields = Vec::new();
        if self.hourly {
            fields.extend(["temperature_2m", "weathercode"]);
        }
        if self.uv {
            fields.push("uv_index");
        }
        (!fields.is_empty()).then(|| fields.join(","))
    }

    pub fn daily_param(&self) -> String {
        let mut fields = vec!["temperature_2m_max", "temperature_2m_min", "weathercode"];
        if self.uv {
            fields.push("uv_index_max");
        }
        fields.join(",")
    }
}

/// Construct the weather provider described by config.
pub fn provider_from_config(config: &Config) -> Box<dyn WeatherProvider> {
    Box::new(OpenMeteoProvider::new(
        config.endpoints.forecast_url.clone(),
        ForecastFields::from_config(config),
    ))
}

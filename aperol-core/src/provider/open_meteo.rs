use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    model::{Coordinates, CurrentWeather, DailySeries, HourlySeries, WeatherSnapshot},
};

use super::{ForecastFields, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    fields: ForecastFields,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>, fields: ForecastFields) -> Self {
        Self { base_url: base_url.into(), fields, http: Client::new() }
    }

    fn query(&self, coords: Coordinates) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("latitude", coords.latitude.to_string()),
            ("longitude", coords.longitude.to_string()),
            ("current_weather", "true".to_string()),
        ];
        if let Some(hourly) = self.fields.hourly_param() {
            query.push(("hourly", hourly));
        }
        query.extend([
            ("daily", self.fields.daily_param()),
            ("timezone", "auto".to_string()),
            ("temperature_unit", "celsius".to_string()),
            ("windspeed_unit", "kmh".to_string()),
        ]);
        query
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: Option<i32>,
    #[serde(default)]
    time: String,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<Option<i32>>,
    #[serde(default)]
    uv_index: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<Option<i32>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current_weather: OmCurrentWeather,
    hourly: Option<OmHourly>,
    daily: OmDaily,
    utc_offset_seconds: Option<i32>,
}

impl From<OmResponse> for WeatherSnapshot {
    fn from(r: OmResponse) -> Self {
        let current = CurrentWeather {
            temperature: r.current_weather.temperature,
            windspeed: r.current_weather.windspeed,
            winddirection: r.current_weather.winddirection,
            weathercode: r.current_weather.weathercode,
            time: r.current_weather.time,
        };

        let hourly = r.hourly.map(|h| HourlySeries {
            time: h.time,
            temperature: h.temperature_2m,
            weathercode: h.weathercode,
            uv_index: h.uv_index,
        });

        let daily = DailySeries {
            time: r.daily.time,
            temperature_max: r.daily.temperature_2m_max,
            temperature_min: r.daily.temperature_2m_min,
            weathercode: r.daily.weathercode,
            uv_index_max: r.daily.uv_index_max,
        };

        WeatherSnapshot { current, hourly, daily, utc_offset_seconds: r.utc_offset_seconds }
    }
}

/// Decode a forecast body. Misaligned columns are kept and logged; lookups
/// past the end of a column render as missing values.
pub fn parse_forecast(body: &str) -> Result<WeatherSnapshot> {
    let parsed: OmResponse =
        serde_json::from_str(body).map_err(|source| Error::Decode { what: "forecast", source })?;
    let snapshot = WeatherSnapshot::from(parsed);

    if !snapshot.daily.is_aligned() {
        warn!(days = snapshot.daily.len(), "daily forecast columns have differing lengths");
    }
    if let Some(hourly) = snapshot.hourly.as_ref().filter(|h| !h.is_aligned()) {
        warn!(hours = hourly.len(), "hourly forecast columns have differing lengths");
    }

    Ok(snapshot)
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_weather(&self, coords: Coordinates) -> Result<WeatherSnapshot> {
        debug!(lat = coords.latitude, lon = coords.longitude, "fetching forecast");

        let res = self.http.get(&self.base_url).query(&self.query(coords)).send().await?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "forecast request failed");
            return Err(Error::WeatherFetch { status });
        }

        let body = res.text().await?;
        parse_forecast(&body)
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A position on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(Error::InvalidCoordinates { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// °C
    pub temperature: f64,
    /// km/h
    pub windspeed: f64,
    /// Degrees.
    pub winddirection: f64,
    pub weathercode: Option<i32>,
    pub time: String,
}

/// Hourly forecast as parallel, position-aligned columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub weathercode: Vec<Option<i32>>,
    pub uv_index: Vec<Option<f64>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn temperature_at(&self, i: usize) -> Option<f64> {
        self.temperature.get(i).copied().flatten()
    }

    pub fn weathercode_at(&self, i: usize) -> Option<i32> {
        self.weathercode.get(i).copied().flatten()
    }

    pub fn uv_at(&self, i: usize) -> Option<f64> {
        self.uv_index.get(i).copied().flatten()
    }

    /// True when every requested column has one value per timestamp.
    /// Columns that were not requested are empty and don't count.
    pub fn is_aligned(&self) -> bool {
        let n = self.time.len();
        [self.temperature.len(), self.weathercode.len(), self.uv_index.len()]
            .iter()
            .all(|&len| len == 0 || len == n)
    }
}

/// Daily forecast columns. Index 0 is today.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temperature_max: Vec<Option<f64>>,
    pub temperature_min: Vec<Option<f64>>,
    pub weathercode: Vec<Option<i32>>,
    pub uv_index_max: Vec<Option<f64>>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn max_at(&self, i: usize) -> Option<f64> {
        self.temperature_max.get(i).copied().flatten()
    }

    pub fn min_at(&self, i: usize) -> Option<f64> {
        self.temperature_min.get(i).copied().flatten()
    }

    pub fn weathercode_at(&self, i: usize) -> Option<i32> {
        self.weathercode.get(i).copied().flatten()
    }

    pub fn uv_max_at(&self, i: usize) -> Option<f64> {
        self.uv_index_max.get(i).copied().flatten()
    }

    pub fn is_aligned(&self) -> bool {
        let n = self.time.len();
        [
            self.temperature_max.len(),
            self.temperature_min.len(),
            self.weathercode.len(),
            self.uv_index_max.len(),
        ]
        .iter()
        .all(|&len| len == 0 || len == n)
    }
}

/// Everything one forecast request returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentWeather,
    pub hourly: Option<HourlySeries>,
    pub daily: DailySeries,
    /// Offset of the location's time zone, when the service reported one.
    pub utc_offset_seconds: Option<i32>,
}

//! UV risk tiers and the drink-chance score.

use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// Qualitative UV risk, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskTier {
    Unknown,
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Unknown => "Unknown",
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
            RiskTier::VeryHigh => "Very High",
            RiskTier::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper bounds are inclusive: 2.0 is Low, 2.01 is Moderate.
pub fn classify_uv(uv: Option<f64>) -> RiskTier {
    match uv {
        None => RiskTier::Unknown,
        Some(u) if u.is_nan() => RiskTier::Unknown,
        Some(u) if u <= 2.0 => RiskTier::Low,
        Some(u) if u <= 5.0 => RiskTier::Moderate,
        Some(u) if u <= 7.0 => RiskTier::High,
        Some(u) if u <= 10.0 => RiskTier::VeryHigh,
        Some(_) => RiskTier::Extreme,
    }
}

/// Score from the day's mean temperature. Never below 1.
pub fn drink_score_from_temperature(max: f64, min: f64) -> u32 {
    let average = (max + min) / 2.0;
    let raw = ((average - 3.0) / 2.0).round();
    // NaN casts to 0 and is clamped like any other low value.
    (raw as i64).clamp(1, i64::from(u32::MAX)) as u32
}

/// Score from a WMO weather code: clear skies score highest.
pub fn drink_score_from_weather_code(code: i32) -> u32 {
    match code {
        c if c <= 3 => 4,
        c if c <= 48 => 3,
        c if c <= 55 => 2,
        _ => 1,
    }
}

/// Which of the two scoring rules feeds the forecast cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkScorePolicy {
    #[default]
    Temperature,
    WeatherCode,
}

impl DrinkScorePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkScorePolicy::Temperature => "temperature",
            DrinkScorePolicy::WeatherCode => "weather_code",
        }
    }

    pub const fn all() -> &'static [DrinkScorePolicy] {
        &[DrinkScorePolicy::Temperature, DrinkScorePolicy::WeatherCode]
    }

    /// Score one forecast day; `None` when the inputs this policy needs are missing.
    pub fn score(&self, max: Option<f64>, min: Option<f64>, code: Option<i32>) -> Option<u32> {
        match self {
            DrinkScorePolicy::Temperature => {
                Some(drink_score_from_temperature(max?, min?))
            }
            DrinkScorePolicy::WeatherCode => code.map(drink_score_from_weather_code),
        }
    }
}

impl fmt::Display for DrinkScorePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DrinkScorePolicy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase().replace('-', "_");

        match lower.as_str() {
            "temperature" => Ok(DrinkScorePolicy::Temperature),
            "weather_code" | "weathercode" => Ok(DrinkScorePolicy::WeatherCode),
            _ => Err(anyhow::anyhow!(
                "Unknown drink score policy '{value}'. Supported policies: temperature, weather_code."
            )),
        }
    }
}

/// How a drink score is shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkStyle {
    #[default]
    Number,
    Glyphs,
}

pub const DRINK_GLYPH: &str = "🍹";
/// Glyph rows never grow past this; the temperature rule is unbounded.
pub const MAX_GLYPHS: u32 = 10;

impl DrinkStyle {
    pub fn format(&self, score: u32) -> String {
        match self {
            DrinkStyle::Number => score.to_string(),
            DrinkStyle::Glyphs => DRINK_GLYPH.repeat(score.min(MAX_GLYPHS) as usize),
        }
    }
}

//! Turns fetched data into view models for the four page regions.
//!
//! Nothing here touches a screen. The pipeline writes the views into a
//! [`Surface`]; the binary decides how a [`Page`] is shown.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;

use crate::{
    Config,
    classify::{DrinkScorePolicy, DrinkStyle, RiskTier, classify_uv},
    model::{CurrentWeather, DailySeries, HourlySeries},
};

pub const NOT_AVAILABLE: &str = "N/A";
pub const FALLBACK_ICON: &str = "❔";

/// Display knobs shared by every render function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub drink_score: DrinkScorePolicy,
    pub drink_style: DrinkStyle,
    pub hourly: bool,
    pub uv: bool,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            drink_score: config.drink_score,
            drink_style: config.drink_style,
            hourly: config.hourly,
            uv: config.uv,
        }
    }
}

/// Glyph for a WMO weather code.
pub fn weather_icon(code: Option<i32>) -> &'static str {
    match code {
        Some(0) => "☀️",
        Some(1) => "🌤️",
        Some(2) => "⛅",
        Some(3) => "☁️",
        Some(45 | 48) => "🌫️",
        Some(51 | 53 | 55) => "🌦️",
        Some(56 | 57 | 61 | 63 | 65 | 66 | 67) => "🌧️",
        Some(71 | 73 | 75 | 77 | 85 | 86) => "❄️",
        Some(80..=82) => "🌦️",
        Some(95 | 96 | 99) => "⛈️",
        _ => FALLBACK_ICON,
    }
}

fn number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn celsius(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v}°C"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn parse_hour(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn format_day(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%a, %b %-d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// A UV value together with its tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UvLine {
    pub value: String,
    pub tier: RiskTier,
}

impl UvLine {
    pub fn new(uv: Option<f64>) -> Self {
        Self { value: number(uv), tier: classify_uv(uv) }
    }
}

impl fmt::Display for UvLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.tier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub temperature: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub uv: Option<UvLine>,
}

impl CurrentView {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Temperature: {}", self.temperature),
            format!("Wind Speed: {} km/h", self.wind_speed),
            format!("Wind Direction: {}°", self.wind_direction),
        ];
        if let Some(uv) = &self.uv {
            lines.push(format!("UV Index: {uv}"));
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub time: String,
    pub icon: &'static str,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastCard {
    pub date: String,
    pub high: String,
    pub low: String,
    pub drink: String,
    pub uv: Option<UvLine>,
}

impl ForecastCard {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.date.clone(),
            format!("High: {}", self.high),
            format!("Low: {}", self.low),
            format!("Aperol Chance: {}", self.drink),
        ];
        if let Some(uv) = &self.uv {
            lines.push(format!("UV Max: {uv}"));
        }
        lines
    }
}

/// UV reading for the hour `now` falls in, if the series has one.
pub fn current_uv(hourly: &HourlySeries, now: NaiveDateTime) -> Option<f64> {
    hourly
        .time
        .iter()
        .position(|raw| {
            parse_hour(raw).is_some_and(|t| t.date() == now.date() && t.hour() == now.hour())
        })
        .and_then(|i| hourly.uv_at(i))
}

/// `uv` is `None` when UV display is off; `Some(None)` renders as unknown.
pub fn render_current(current: &CurrentWeather, uv: Option<Option<f64>>) -> CurrentView {
    CurrentView {
        temperature: celsius(Some(current.temperature)),
        wind_speed: number(Some(current.windspeed)),
        wind_direction: number(Some(current.winddirection)),
        uv: uv.map(UvLine::new),
    }
}

/// Indices of entries on `now`'s date at or after `now`'s hour, in series order.
pub fn visible_hours(hourly: &HourlySeries, now: NaiveDateTime) -> Vec<usize> {
    hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let t = parse_hour(raw)?;
            (t.date() == now.date() && t.hour() >= now.hour()).then_some(i)
        })
        .collect()
}

pub fn render_hourly(hourly: &HourlySeries, now: NaiveDateTime) -> Vec<HourlyEntry> {
    visible_hours(hourly, now)
        .into_iter()
        .map(|i| HourlyEntry {
            time: parse_hour(&hourly.time[i])
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| hourly.time[i].clone()),
            icon: weather_icon(hourly.weathercode_at(i)),
            temperature: celsius(hourly.temperature_at(i)),
        })
        .collect()
}

/// One card per upcoming day; today (index 0) is skipped.
pub fn render_forecast(daily: &DailySeries, options: &RenderOptions) -> Vec<ForecastCard> {
    (1..daily.len())
        .map(|i| {
            let max = daily.max_at(i);
            let min = daily.min_at(i);
            let drink = options
                .drink_score
                .score(max, min, daily.weathercode_at(i))
                .map(|score| options.drink_style.format(score))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            ForecastCard {
                date: format_day(&daily.time[i]),
                high: celsius(max),
                low: celsius(min),
                drink,
                uv: options.uv.then(|| UvLine::new(daily.uv_max_at(i))),
            }
        })
        .collect()
}

/// What the current-weather region holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentRegion {
    Weather(CurrentView),
    Error { message: String },
}

/// Write-only target for the pipeline.
pub trait Surface {
    fn show_place_name(&mut self, name: &str);
    fn show_current(&mut self, view: CurrentView);
    fn show_hourly(&mut self, entries: Vec<HourlyEntry>);
    fn show_forecast(&mut self, cards: Vec<ForecastCard>);
    /// Replace the current-weather region with `message` and clear the forecast.
    fn show_error(&mut self, message: &str);
}

/// In-memory page: the four regions as last written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub place_name: Option<String>,
    pub current: Option<CurrentRegion>,
    pub hourly: Option<Vec<HourlyEntry>>,
    pub forecast: Vec<ForecastCard>,
}

impl Page {
    pub fn error(&self) -> Option<&str> {
        match &self.current {
            Some(CurrentRegion::Error { message }) => Some(message),
            _ => None,
        }
    }
}

impl Surface for Page {
    fn show_place_name(&mut self, name: &str) {
        self.place_name = Some(name.to_string());
    }

    fn show_current(&mut self, view: CurrentView) {
        self.current = Some(CurrentRegion::Weather(view));
    }

    fn show_hourly(&mut self, entries: Vec<HourlyEntry>) {
        self.hourly = Some(entries);
    }

    fn show_forecast(&mut self, cards: Vec<ForecastCard>) {
        self.forecast = cards;
    }

    fn show_error(&mut self, message: &str) {
        self.current = Some(CurrentRegion::Error { message: message.to_string() });
        self.forecast.clear();
    }
}

//! Core library for the `aperol` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Geolocation, reverse geocoding and weather clients behind traits
//! - UV risk tiers and the drink-chance score
//! - View models for the rendered page, and the pipeline that fills them
//! - The decorative background effect
//!
//! It is used by `aperol-cli`, but can also be reused by other frontends.

pub mod classify;
pub mod config;
pub mod effect;
pub mod error;
pub mod geocode;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod render;

pub use classify::{DrinkScorePolicy, DrinkStyle, RiskTier};
pub use config::{Config, GeolocationMode};
pub use effect::{Decoration, EffectState, EffectToggle};
pub use error::{Error, Result};
pub use geocode::{NominatimClient, PlaceResolver};
pub use location::{GeoProvider, location_from_config};
pub use model::{Coordinates, CurrentWeather, DailySeries, HourlySeries, WeatherSnapshot};
pub use pipeline::{Pipeline, PipelineReport, Stage};
pub use provider::{WeatherProvider, provider_from_config};
pub use render::{Page, RenderOptions, Surface};

//! Where the caller is.
//!
//! A [`GeoProvider`] hands out one position per run. The IP lookup stands in
//! for platform geolocation; any failure it hits is reported as a
//! geolocation error with the underlying message.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::{
    config::{Config, GeolocationMode},
    error::{Error, Result},
    model::Coordinates,
};

#[async_trait]
pub trait GeoProvider: Send + Sync + Debug {
    /// Whether this provider can produce a position at all.
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates>;
}

/// A position known up front.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl GeoProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates> {
        Ok(self.0)
    }
}

/// No way to locate the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl GeoProvider for NoLocation {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates> {
        Err(Error::CapabilityUnavailable)
    }
}

/// Approximate position from the public IP address (ip-api.com JSON shape).
#[derive(Debug, Clone)]
pub struct IpLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }
}

#[async_trait]
impl GeoProvider for IpLocator {
    async fn current_position(&self) -> Result<Coordinates> {
        debug!(url = %self.url, "looking up position from IP address");

        let res = self
            .http
            .get(&self.url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| Error::Geolocation(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::Geolocation(format!("lookup service returned {status}")));
        }

        let body = res.text().await.map_err(|e| Error::Geolocation(e.to_string()))?;
        let parsed: IpLookupResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Geolocation(format!("unreadable lookup response: {e}")))?;

        if parsed.status != "success" {
            let reason = parsed.message.unwrap_or_else(|| "position unavailable".to_string());
            return Err(Error::Geolocation(reason));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => {
                let coords = Coordinates::new(lat, lon)
                    .map_err(|e| Error::Geolocation(e.to_string()))?;
                info!(lat, lon, "position resolved from IP address");
                Ok(coords)
            }
            _ => Err(Error::Geolocation("position unavailable".to_string())),
        }
    }
}

/// Pick a provider: an explicit override wins, then the configured fixed
/// location, then the configured lookup mode.
pub fn location_from_config(
    config: &Config,
    override_coords: Option<Coordinates>,
) -> Result<Box<dyn GeoProvider>> {
    if let Some(coords) = override_coords {
        return Ok(Box::new(FixedLocation(coords)));
    }

    if let Some(fixed) = config.location {
        let coords = Coordinates::new(fixed.latitude, fixed.longitude)?;
        return Ok(Box::new(FixedLocation(coords)));
    }

    let provider: Box<dyn GeoProvider> = match config.geolocation {
        GeolocationMode::Ip => Box::new(IpLocator::new(config.endpoints.ip_lookup_url.clone())),
        GeolocationMode::Off => Box::new(NoLocation),
    };
    Ok(provider)
}

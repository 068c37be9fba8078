//! Reverse geocoding: coordinates to a human-readable place name.
//! Uses Nominatim (OpenStreetMap), no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    model::Coordinates,
};

pub const UNKNOWN_LOCATION: &str = "Unknown location";

const USER_AGENT: &str = concat!("aperol/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait PlaceResolver: Send + Sync + Debug {
    async fn resolve_place_name(&self, coords: Coordinates) -> Result<String>;
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimResponse {
    pub address: Option<NominatimAddress>,
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
}

/// Best available name: the first non-empty of city, town, village, county,
/// state. The display name is only used when there is no address at all.
pub fn place_name_from(response: NominatimResponse) -> String {
    if let Some(addr) = response.address {
        return [addr.city, addr.town, addr.village, addr.county, addr.state]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
    }

    response
        .display_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    language: String,
    http: Client,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>, language: impl Into<String>) -> Result<Self> {
        // Nominatim rejects requests without an identifying User-Agent.
        let http = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { base_url: base_url.into(), language: language.into(), http })
    }
}

#[async_trait]
impl PlaceResolver for NominatimClient {
    async fn resolve_place_name(&self, coords: Coordinates) -> Result<String> {
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();

        debug!(%lat, %lon, "reverse geocoding");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("zoom", "10"),
                ("addressdetails", "1"),
                ("accept-language", self.language.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "reverse geocode request failed");
            return Err(Error::LocationFetch { status });
        }

        let body = res.text().await?;
        let parsed: NominatimResponse = serde_json::from_str(&body)
            .map_err(|source| Error::Decode { what: "reverse geocode", source })?;

        let name = place_name_from(parsed);
        info!(place = %name, "reverse geocoded");
        Ok(name)
    }
}

use reqwest::StatusCode;

/// Everything that can end a pipeline run.
///
/// The `Display` text of each variant is what the user sees in the current
/// weather region, so it is kept short and free of internals. Status codes are
/// carried for logging only.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Geolocation is not supported on this system.")]
    CapabilityUnavailable,

    #[error("Geolocation error: {0}")]
    Geolocation(String),

    #[error("Location data fetch failed")]
    LocationFetch { status: StatusCode },

    #[error("Weather data fetch failed")]
    WeatherFetch { status: StatusCode },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_hide_status_from_message() {
        let err = Error::WeatherFetch { status: StatusCode::INTERNAL_SERVER_ERROR };
        assert_eq!(err.to_string(), "Weather data fetch failed");

        let err = Error::LocationFetch { status: StatusCode::TOO_MANY_REQUESTS };
        assert_eq!(err.to_string(), "Location data fetch failed");
    }

    #[test]
    fn geolocation_message_is_prefixed() {
        let err = Error::Geolocation("User denied Geolocation".into());
        assert_eq!(err.to_string(), "Geolocation error: User denied Geolocation");
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from geocoder")]
    UnexpectedStatus { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The geocoder answered with coordinates that are not numbers or are out
    /// of range.
    #[error("invalid coordinate from geocoder: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: String, lon: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use skopus_core::Coordinate;

use crate::error::GeoError;
use crate::geocoder::Geocoder;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// One match of a Nominatim `/search` query. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint.
///
/// Only the best match is requested. The public instance requires an
/// identifying `User-Agent`, so one is always sent.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: Url,
}

impl NominatimClient {
    /// Creates a client for the public OpenStreetMap instance.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, GeoError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client for a custom instance (or a wiremock server).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    fn search_url(&self) -> Result<Url, GeoError> {
        self.base_url
            .join("search")
            .map_err(|e| GeoError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Geocoder for NominatimClient {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinate>, GeoError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.search_url()?)
            .query(&[("format", "json"), ("q", address), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let places: Vec<Place> =
            serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
                context: format!("geocode search for \"{address}\""),
                source: e,
            })?;

        places.first().map(parse_place).transpose()
    }
}

fn parse_place(place: &Place) -> Result<Coordinate, GeoError> {
    let invalid = || GeoError::InvalidCoordinate {
        lat: place.lat.clone(),
        lon: place.lon.clone(),
    };
    let lat = place.lat.trim().parse::<f64>().map_err(|_| invalid())?;
    let lng = place.lon.trim().parse::<f64>().map_err(|_| invalid())?;
    let coord = Coordinate::new(lat, lng);
    if coord.is_valid() {
        Ok(coord)
    } else {
        Err(invalid())
    }
}

//! Lead records and the search query that produces them.
//!
//! [`Lead`] mirrors the JSON objects returned by the generative search
//! service, so the serde names follow the service's camelCase wire format.
//! The same shape is sent to the web front end.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::Coordinate;

/// First page number of every search session.
pub const FIRST_PAGE: u32 = 1;

/// A candidate business returned by one page of a lead search.
///
/// Immutable once parsed. `id` is whatever the search service supplied and is
/// not guaranteed to be unique across pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Average rating on a 0.0–5.0 scale. `None` means unrated.
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,
    #[serde(rename = "instagram", default)]
    pub instagram_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,
    #[serde(rename = "whatsapp", default)]
    pub whatsapp_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    pub address: String,
}

impl Lead {
    /// Rating constrained to the valid scale; out-of-range or non-finite
    /// values are reported as unrated.
    #[must_use]
    pub fn valid_rating(&self) -> Option<f64> {
        self.rating
            .filter(|r| r.is_finite() && (0.0..=5.0).contains(r))
    }
}

/// Where a search should look: a typed place name or the device position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LocationDescriptor {
    Place(String),
    Device(Coordinate),
}

impl LocationDescriptor {
    /// `false` for a blank place name or an out-of-range device coordinate.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        match self {
            Self::Place(place) => !place.trim().is_empty(),
            Self::Device(coord) => coord.is_valid(),
        }
    }
}

impl fmt::Display for LocationDescriptor {
    /// Renders the descriptor the way the search prompt expects it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place(place) => f.write_str(place.trim()),
            Self::Device(coord) => write!(f, "Coord: {coord}"),
        }
    }
}

/// The active search parameters and page counter of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub niche: String,
    pub location: LocationDescriptor,
    pub page: u32,
}

impl SearchQuery {
    #[must_use]
    pub fn new(niche: impl Into<String>, location: LocationDescriptor) -> Self {
        Self {
            niche: niche.into(),
            location,
            page: FIRST_PAGE,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// Accepts a number, a numeric string (`"4,5"` included) or null.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let raw: Option<Raw> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
        None => None,
    })
}

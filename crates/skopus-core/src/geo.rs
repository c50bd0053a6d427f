use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` when both components are finite and inside the valid ranges
    /// (`-90..=90` latitude, `-180..=180` longitude).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    /// Parses `"lat,lng"` (whitespace around either component is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected \"lat,lng\", got \"{s}\""))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid latitude \"{}\": {e}", lat.trim()))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid longitude \"{}\": {e}", lng.trim()))?;
        let coord = Self { lat, lng };
        if !coord.is_valid() {
            return Err(format!("coordinate out of range: {coord}"));
        }
        Ok(coord)
    }
}

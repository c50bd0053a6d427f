//! Address geocoding and the map surface that lead markers are drawn on.

pub mod bounds;
pub mod error;
pub mod geocoder;
pub mod map;
pub mod nominatim;

pub use bounds::Bounds;
pub use error::GeoError;
pub use geocoder::{normalize_address, CachedGeocoder, Geocoder};
pub use map::{
    Circle, MapSnapshot, MapSurface, Marker, MarkerHandle, MarkerLabel, MarkerMap, Viewport,
};
pub use nominatim::NominatimClient;

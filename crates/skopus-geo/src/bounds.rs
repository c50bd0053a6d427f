//! Lat/lng bounding boxes.

use serde::Serialize;
use skopus_core::Coordinate;

/// Axis-aligned box in degrees. Antimeridian crossing is not handled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every point; `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let seed = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(iter.fold(seed, |b, p| Self {
            south: b.south.min(p.lat),
            west: b.west.min(p.lng),
            north: b.north.max(p.lat),
            east: b.east.max(p.lng),
        }))
    }

    /// Grows every side by `ratio` of the box's height or width.
    ///
    /// A single-point box stays a point.
    #[must_use]
    pub fn pad(&self, ratio: f64) -> Self {
        let lat_buffer = (self.north - self.south).abs() * ratio;
        let lng_buffer = (self.east - self.west).abs() * ratio;
        Self {
            south: self.south - lat_buffer,
            west: self.west - lng_buffer,
            north: self.north + lat_buffer,
            east: self.east + lng_buffer,
        }
    }

    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lng)
    }
}

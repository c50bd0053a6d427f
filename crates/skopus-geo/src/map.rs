//! The map surface lead markers are drawn on.
//!
//! [`MapSurface`] is the sink the search controller drives. [`MarkerMap`] is
//! the in-memory implementation: it keeps markers, the radius circle and the
//! current viewport so a front end can render the state from a
//! [`MapSnapshot`].

use serde::Serialize;
use skopus_core::{Coordinate, Lead};

use crate::bounds::Bounds;

/// Zoom of a freshly initialised map.
pub const INITIAL_ZOOM: u8 = 13;

/// Identifies one marker on a surface until the markers are cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkerHandle(pub u64);

/// Popup content of a lead marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLabel {
    pub name: String,
    pub rating: String,
    pub instagram_url: String,
    pub instagram: String,
    pub whatsapp_url: String,
    pub whatsapp: String,
    pub address: String,
}

impl MarkerLabel {
    #[must_use]
    pub fn from_lead(lead: &Lead) -> Self {
        let rating = lead
            .valid_rating()
            .filter(|r| *r > 0.0)
            .map_or_else(|| "★ N/A".to_owned(), |r| format!("★ {r}"));
        Self {
            name: lead.name.clone(),
            rating,
            instagram_url: lead.instagram_url.clone(),
            instagram: non_blank(lead.instagram_handle.as_deref()).unwrap_or("@perfil").to_owned(),
            whatsapp_url: lead.whatsapp_url.clone(),
            whatsapp: non_blank(lead.whatsapp_number.as_deref()).unwrap_or("Link").to_owned(),
            address: lead.address.clone(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub position: Coordinate,
    pub label: MarkerLabel,
}

/// Search-radius overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub center: Coordinate,
    pub radius_km: u32,
}

/// What the map is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Viewport {
    Centered { center: Coordinate, zoom: u8 },
    Fitted { bounds: Bounds },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSnapshot {
    pub viewport: Viewport,
    pub circle: Circle,
    pub markers: Vec<Marker>,
}

/// Operations the search controller needs from a map widget.
///
/// None of these fail. An empty marker set is a normal state.
pub trait MapSurface: Send {
    fn initialize(&mut self, center: Coordinate, radius_km: u32);

    /// Redraws the radius circle. Purely visual.
    fn set_radius(&mut self, radius_km: u32);

    /// Moves the radius circle without changing the viewport.
    fn center_circle(&mut self, center: Coordinate);

    fn add_marker(&mut self, position: Coordinate, label: MarkerLabel) -> MarkerHandle;

    fn remove_all_markers(&mut self);

    /// Fits the viewport to every marker, padded by `padding` of the box
    /// size. No-op without markers.
    fn fit_to_markers(&mut self, padding: f64);

    fn pan_to(&mut self, center: Coordinate, zoom: u8);

    fn marker_count(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct MarkerMap {
    viewport: Viewport,
    circle: Circle,
    markers: Vec<Marker>,
    next_handle: u64,
}

impl MarkerMap {
    #[must_use]
    pub fn new(center: Coordinate, radius_km: u32) -> Self {
        Self {
            viewport: Viewport::Centered {
                center,
                zoom: INITIAL_ZOOM,
            },
            circle: Circle { center, radius_km },
            markers: Vec::new(),
            next_handle: 0,
        }
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn circle(&self) -> Circle {
        self.circle
    }

    #[must_use]
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            viewport: self.viewport,
            circle: self.circle,
            markers: self.markers.clone(),
        }
    }
}

impl MapSurface for MarkerMap {
    fn initialize(&mut self, center: Coordinate, radius_km: u32) {
        self.viewport = Viewport::Centered {
            center,
            zoom: INITIAL_ZOOM,
        };
        self.circle = Circle { center, radius_km };
    }

    fn set_radius(&mut self, radius_km: u32) {
        self.circle.radius_km = radius_km;
    }

    fn center_circle(&mut self, center: Coordinate) {
        self.circle.center = center;
    }

    fn add_marker(&mut self, position: Coordinate, label: MarkerLabel) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.push(Marker {
            handle,
            position,
            label,
        });
        handle
    }

    fn remove_all_markers(&mut self) {
        self.markers.clear();
    }

    fn fit_to_markers(&mut self, padding: f64) {
        if let Some(bounds) = Bounds::from_points(self.markers.iter().map(|m| m.position)) {
            self.viewport = Viewport::Fitted {
                bounds: bounds.pad(padding),
            };
        }
    }

    fn pan_to(&mut self, center: Coordinate, zoom: u8) {
        self.viewport = Viewport::Centered { center, zoom };
    }

    fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

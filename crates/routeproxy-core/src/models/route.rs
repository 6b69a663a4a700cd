use geojson::{Feature, Geometry, Value as GeometryValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

/// Driving route between two points, as returned by the provider
///
/// Distance and duration keep the provider's number representation so they
/// are re-emitted exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Route length in meters
    pub distance: Number,

    /// Expected travel time in seconds
    pub duration: Number,

    /// Full-detail route geometry (a GeoJSON LineString)
    pub geometry: Geometry,
}

impl RouteResult {
    pub fn new(distance: Number, duration: Number, geometry: Geometry) -> Self {
        Self {
            distance,
            duration,
            geometry,
        }
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance.as_f64().unwrap_or_default()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_f64().unwrap_or_default()
    }

    /// Whether the geometry is a LineString with at least two positions
    pub fn has_line_geometry(&self) -> bool {
        matches!(&self.geometry.value, GeometryValue::LineString(points) if points.len() >= 2)
    }

    /// Wrap the geometry in a GeoJSON feature carrying distance and duration
    pub fn to_feature(&self) -> Feature {
        let mut properties = Map::new();
        properties.insert("distance".to_string(), JsonValue::Number(self.distance.clone()));
        properties.insert("duration".to_string(), JsonValue::Number(self.duration.clone()));

        Feature {
            geometry: Some(self.geometry.clone()),
            properties: Some(properties),
            id: None,
            bbox: None,
            foreign_members: None,
        }
    }
}

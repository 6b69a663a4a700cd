use geojson::Feature;
use routeproxy_core::models::{LngLat, RouteResult};
use serde::Serialize;
use serde_json::Number;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Route proxy is running".to_string(),
        }
    }
}

/// Geocode response
#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub coordinates: LngLat,
}

/// Route response: summary numbers plus the line as a GeoJSON feature
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub distance: Number,
    pub duration: Number,
    pub feature: Feature,
}

impl From<RouteResult> for RouteResponse {
    fn from(route: RouteResult) -> Self {
        let feature = route.to_feature();
        Self {
            distance: route.distance,
            duration: route.duration,
            feature,
        }
    }
}

//! Wire types for the Mapbox geocoding and directions APIs

use serde::Deserialize;

/// Response from the forward geocoding API
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodingResponse {
    #[serde(default)]
    pub features: Vec<GeocodingFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodingFeature {
    pub id: String,
    pub place_name: String,
    pub center: Vec<f64>,
}

/// Response from the directions API
#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsRoute {
    pub distance: serde_json::Number,
    pub duration: serde_json::Number,
    pub geometry: geojson::Geometry,
}

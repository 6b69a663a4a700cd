use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Suggestion request body
///
/// `proximity` is kept as raw JSON so a malformed pair can fall back to the
/// configured default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub proximity: Option<JsonValue>,
}

/// Geocode request body
#[derive(Debug, Default, Deserialize)]
pub struct GeocodeRequest {
    #[serde(default)]
    pub location: Option<String>,
}

/// Route request body
///
/// Points are validated by the route service so that wrong arity or
/// non-numeric values produce a 400 with a useful message.
#[derive(Debug, Default, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub start: Option<JsonValue>,
    #[serde(default)]
    pub end: Option<JsonValue>,
}

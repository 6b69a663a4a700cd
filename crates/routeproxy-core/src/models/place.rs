use serde::{Deserialize, Serialize};

use super::LngLat;

/// Minimum number of characters (after trimming) before a query is sent upstream
pub const MIN_QUERY_CHARS: usize = 2;

/// Candidate place returned for partial user input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    /// Provider feature identifier
    pub id: String,

    /// Human readable place name
    pub place_name: String,

    /// Place center as `[lon, lat]`
    pub center: LngLat,
}

/// Normalized autocomplete query
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionQuery {
    /// Trimmed query text
    pub text: String,

    /// Point results are biased towards
    pub proximity: LngLat,
}

impl SuggestionQuery {
    /// Create a query, trimming surrounding whitespace from the text
    pub fn new(text: &str, proximity: LngLat) -> Self {
        Self {
            text: text.trim().to_string(),
            proximity,
        }
    }

    /// Whether the query is long enough to be worth an upstream call
    pub fn is_searchable(&self) -> bool {
        self.text.chars().count() >= MIN_QUERY_CHARS
    }

    /// Cache key: lowercase text plus proximity rounded to three decimals
    pub fn cache_key(&self) -> String {
        format!("{}|{}", self.text.to_lowercase(), self.proximity.rounded_key())
    }
}

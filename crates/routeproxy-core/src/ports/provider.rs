use async_trait::async_trait;

use crate::error::Result;
use crate::models::{LngLat, PlaceSuggestion, RouteResult, SuggestionQuery};

/// Port for the upstream mapping provider
///
/// Implementations perform exactly one outbound attempt per call and never
/// retry. Failures are reported through the upstream variants of
/// [`ProxyError`](crate::error::ProxyError).
#[async_trait]
pub trait MapProvider: Send + Sync {
    /// Autocomplete suggestions for partial input, at most `limit` entries
    async fn suggest(&self, query: &SuggestionQuery, limit: usize) -> Result<Vec<PlaceSuggestion>>;

    /// Forward geocode free text, returning the best match if any
    async fn geocode(&self, location: &str) -> Result<Option<LngLat>>;

    /// Driving routes between two points, best route first
    async fn directions(&self, start: LngLat, end: LngLat) -> Result<Vec<RouteResult>>;

    /// Provider name used in logs
    fn name(&self) -> &str;
}

use routeproxy_core::models::{LngLat, PlaceSuggestion, SuggestionQuery};
use serde_json::Value as JsonValue;

use crate::dto::SuggestionRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// Cached autocomplete lookups
pub struct SuggestionService;

impl SuggestionService {
    /// Resolve suggestions for a typed prefix
    ///
    /// Queries shorter than two characters short-circuit to an empty list.
    /// Hits are served from the cache without touching the provider; misses
    /// are fetched and cached for the configured TTL. Failures are never
    /// cached.
    pub async fn execute(
        state: &AppState,
        request: &SuggestionRequest,
    ) -> Result<Vec<PlaceSuggestion>, ApiError> {
        let proximity =
            Self::resolve_proximity(request.proximity.as_ref(), state.settings.proximity);
        let query = SuggestionQuery::new(&request.query, proximity);

        if !query.is_searchable() {
            return Ok(Vec::new());
        }

        let key = query.cache_key();
        if let Some(cached) = state.cache.get(&key) {
            tracing::debug!(key = %key, results = cached.len(), "Suggestion cache hit");
            return Ok(cached);
        }

        let suggestions = state
            .provider
            .suggest(&query, state.settings.suggestion_limit)
            .await
            .map_err(|e| {
                tracing::error!(
                    provider = state.provider.name(),
                    timeout = e.is_timeout(),
                    error = %e,
                    "Suggestion lookup failed"
                );
                ApiError::from(e)
            })?;

        tracing::debug!(key = %key, results = suggestions.len(), "Caching suggestions");
        state.cache.insert(&key, suggestions.clone());

        Ok(suggestions)
    }

    /// Use the request's proximity when it is a valid pair, else the default
    fn resolve_proximity(raw: Option<&JsonValue>, fallback: LngLat) -> LngLat {
        match raw {
            None | Some(JsonValue::Null) => fallback,
            Some(value) => LngLat::from_json(value).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Ignoring malformed proximity");
                fallback
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fallback() -> LngLat {
        LngLat::new(-4.0083, 5.36).unwrap()
    }

    #[test]
    fn test_proximity_defaults_when_absent() {
        assert_eq!(SuggestionService::resolve_proximity(None, fallback()), fallback());
        assert_eq!(
            SuggestionService::resolve_proximity(Some(&JsonValue::Null), fallback()),
            fallback()
        );
    }

    #[test]
    fn test_proximity_from_request() {
        let raw = json!([2.35, 48.85]);
        let resolved = SuggestionService::resolve_proximity(Some(&raw), fallback());
        assert_eq!(resolved, LngLat::new(2.35, 48.85).unwrap());
    }

    #[test]
    fn test_malformed_proximity_falls_back() {
        for raw in [json!([1.0]), json!("here"), json!([500.0, 1.0])] {
            assert_eq!(SuggestionService::resolve_proximity(Some(&raw), fallback()), fallback());
        }
    }
}

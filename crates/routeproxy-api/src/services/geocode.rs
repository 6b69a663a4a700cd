use routeproxy_core::error::ProxyError;
use routeproxy_core::models::LngLat;

use crate::dto::GeocodeRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// Free-text address to coordinates, uncached
pub struct GeocodeService;

impl GeocodeService {
    pub async fn execute(state: &AppState, request: &GeocodeRequest) -> Result<LngLat, ApiError> {
        let location = request.location.as_deref().map(str::trim).unwrap_or_default();
        if location.is_empty() {
            return Err(ProxyError::InvalidInput("Location is required".to_string()).into());
        }

        let coordinates = state.provider.geocode(location).await.map_err(|e| {
            tracing::error!(
                provider = state.provider.name(),
                timeout = e.is_timeout(),
                error = %e,
                "Geocoding failed"
            );
            ApiError::from(e)
        })?;

        coordinates.ok_or_else(|| {
            ApiError::from(ProxyError::NotFound(format!("No results found for '{}'", location)))
        })
    }
}

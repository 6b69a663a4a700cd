use routeproxy_core::error::ProxyError;
use routeproxy_core::models::LngLat;
use serde_json::Value as JsonValue;

use crate::dto::{RouteRequest, RouteResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Driving directions between two validated points
pub struct RouteService;

impl RouteService {
    /// Validate both endpoints, then return the provider's first route
    pub async fn execute(
        state: &AppState,
        request: &RouteRequest,
    ) -> Result<RouteResponse, ApiError> {
        let start = Self::parse_point("start", request.start.as_ref())?;
        let end = Self::parse_point("end", request.end.as_ref())?;

        let routes = state.provider.directions(start, end).await.map_err(|e| {
            tracing::error!(
                provider = state.provider.name(),
                timeout = e.is_timeout(),
                error = %e,
                "Directions lookup failed"
            );
            ApiError::from(e)
        })?;

        let first = routes
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::from(ProxyError::NotFound("No route found".to_string())))?;

        tracing::debug!(
            distance = first.distance_meters(),
            duration = first.duration_seconds(),
            "Route computed"
        );

        Ok(first.into())
    }

    fn parse_point(name: &str, raw: Option<&JsonValue>) -> Result<LngLat, ApiError> {
        let value = raw.ok_or_else(|| {
            ApiError::from(ProxyError::InvalidInput(format!("Missing '{}' coordinates", name)))
        })?;

        LngLat::from_json(value).map_err(|e| match e {
            ProxyError::InvalidInput(reason) => {
                ApiError::bad_request(format!("Invalid '{}' coordinates", name))
                    .with_details(reason)
            }
            other => other.into(),
        })
    }
}

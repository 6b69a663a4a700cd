use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use routeproxy_core::config::{ProxySettings, DEFAULT_PROVIDER_URL};
use routeproxy_core::error::{ProxyError, Result};
use routeproxy_core::models::{
    LngLat, PlaceSuggestion, RouteResult, SuggestionQuery, UpstreamEndpoint,
};
use routeproxy_core::ports::MapProvider;
use serde::de::DeserializeOwned;

use crate::dto::{DirectionsResponse, GeocodingResponse};

/// Mapbox refuses geocoding limits above this value
const MAX_PROVIDER_LIMIT: usize = 10;

/// Mapbox adapter configuration
#[derive(Debug, Clone)]
pub struct MapboxConfig {
    /// API root (e.g., "https://api.mapbox.com")
    pub base_url: String,

    /// Access token sent as `access_token`
    pub access_token: Option<String>,

    pub suggest_timeout: Duration,
    pub geocode_timeout: Duration,
    pub route_timeout: Duration,

    /// Optional ISO 3166 country filter for geocoding
    pub country: Option<String>,

    /// Optional response language for geocoding
    pub language: Option<String>,
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            access_token: None,
            suggest_timeout: Duration::from_secs(6),
            geocode_timeout: Duration::from_secs(6),
            route_timeout: Duration::from_secs(10),
            country: None,
            language: None,
        }
    }
}

impl MapboxConfig {
    pub fn from_settings(settings: &ProxySettings) -> Self {
        Self {
            base_url: settings.provider_url.clone(),
            access_token: settings.api_key.clone(),
            suggest_timeout: settings.suggest_timeout,
            geocode_timeout: settings.geocode_timeout,
            route_timeout: settings.route_timeout,
            country: settings.country.clone(),
            language: settings.language.clone(),
        }
    }
}

/// Mapbox implementation of [`MapProvider`]
///
/// A single `reqwest::Client` is built at construction and shared by every
/// call, so keep-alive connections to the provider are pooled and reused.
pub struct MapboxProvider {
    config: MapboxConfig,
    base_url: Url,
    client: reqwest::Client,
}

impl MapboxProvider {
    /// Create a provider with a pooled keep-alive client
    pub fn new(config: MapboxConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ProxyError::ConfigInvalid {
            key: "provider_url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", config.base_url, e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ProxyError::ConfigInvalid {
                key: "provider_url".to_string(),
                reason: format!("'{}' cannot be used as a base URL", config.base_url),
            });
        }

        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(16)
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("routeproxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProxyError::ConfigInvalid {
                key: "http_client".to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Create with the default Mapbox URL
    pub fn with_token(access_token: impl Into<String>) -> Result<Self> {
        Self::new(MapboxConfig {
            access_token: Some(access_token.into()),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &MapboxConfig {
        &self.config
    }

    /// Build a provider URL from path segments and query parameters
    ///
    /// Segments are percent-encoded individually, so user text containing
    /// `/` or `?` stays inside its segment.
    fn endpoint_url(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| ProxyError::ConfigInvalid {
                key: "provider_url".to_string(),
                reason: "cannot be used as a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            if let Some(token) = &self.config.access_token {
                pairs.append_pair("access_token", token);
            }
        }

        Ok(url)
    }

    /// Geocoding filters shared by suggestions and geocode
    fn geocoding_filters(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(country) = &self.config.country {
            params.push(("country", country.clone()));
        }
        if let Some(language) = &self.config.language {
            params.push(("language", language.clone()));
        }
    }

    /// Perform one GET and decode the JSON body
    ///
    /// The URL is never logged since it carries the access token.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: UpstreamEndpoint,
        url: Url,
        timeout: Duration,
    ) -> Result<T> {
        let path = url.path().to_string();

        tracing::debug!(endpoint = %endpoint, path = %path, "Calling upstream provider");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, timeout, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                timeout = false,
                body = %truncate(&body, 200),
                "Upstream provider returned an error status"
            );
            return Err(ProxyError::UpstreamError {
                endpoint,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(endpoint, timeout, &e)
            } else {
                tracing::warn!(
                    endpoint = %endpoint,
                    error = %e,
                    "Failed to decode upstream response"
                );
                ProxyError::UpstreamUnavailable {
                    endpoint,
                    reason: format!("Failed to parse response: {}", e),
                }
            }
        })
    }
}

#[async_trait]
impl MapProvider for MapboxProvider {
    async fn suggest(&self, query: &SuggestionQuery, limit: usize) -> Result<Vec<PlaceSuggestion>> {
        let limit = limit.clamp(1, MAX_PROVIDER_LIMIT);
        let search = format!("{}.json", query.text);

        let mut params = vec![
            ("autocomplete", "true".to_string()),
            ("limit", limit.to_string()),
            ("proximity", query.proximity.to_query_value()),
        ];
        self.geocoding_filters(&mut params);

        let url = self.endpoint_url(&["geocoding", "v5", "mapbox.places", &search], &params)?;
        let response: GeocodingResponse = self
            .get_json(UpstreamEndpoint::Suggestions, url, self.config.suggest_timeout)
            .await?;

        let suggestions = response
            .features
            .into_iter()
            .filter_map(|feature| match center_of(&feature.center) {
                Some(center) => {
                    Some(PlaceSuggestion {
                        id: feature.id,
                        place_name: feature.place_name,
                        center,
                    })
                }
                None => {
                    tracing::debug!(id = %feature.id, "Skipping feature with invalid center");
                    None
                }
            })
            .take(limit)
            .collect();

        Ok(suggestions)
    }

    async fn geocode(&self, location: &str) -> Result<Option<LngLat>> {
        let search = format!("{}.json", location.trim());

        let mut params = vec![("limit", "1".to_string())];
        self.geocoding_filters(&mut params);

        let url = self.endpoint_url(&["geocoding", "v5", "mapbox.places", &search], &params)?;
        let response: GeocodingResponse =
            self.get_json(UpstreamEndpoint::Geocode, url, self.config.geocode_timeout).await?;

        Ok(response.features.iter().find_map(|feature| center_of(&feature.center)))
    }

    async fn directions(&self, start: LngLat, end: LngLat) -> Result<Vec<RouteResult>> {
        let waypoints = format!("{};{}", start.to_query_value(), end.to_query_value());
        let params = [("geometries", "geojson".to_string()), ("overview", "full".to_string())];

        let url = self.endpoint_url(
            &["directions", "v5", "mapbox", "driving", &waypoints],
            &params,
        )?;
        let response: DirectionsResponse =
            self.get_json(UpstreamEndpoint::Directions, url, self.config.route_timeout).await?;

        if response.routes.is_empty() {
            tracing::debug!(code = ?response.code, "Directions returned no routes");
        }

        response
            .routes
            .into_iter()
            .map(|route| {
                let result = RouteResult::new(route.distance, route.duration, route.geometry);
                if result.has_line_geometry() {
                    Ok(result)
                } else {
                    Err(ProxyError::UpstreamUnavailable {
                        endpoint: UpstreamEndpoint::Directions,
                        reason: "Route geometry is not a LineString".to_string(),
                    })
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "mapbox"
    }
}

fn center_of(center: &[f64]) -> Option<LngLat> {
    match center {
        [lon, lat] => LngLat::new(*lon, *lat).ok(),
        _ => None,
    }
}

fn transport_error(
    endpoint: UpstreamEndpoint,
    timeout: Duration,
    err: &reqwest::Error,
) -> ProxyError {
    if err.is_timeout() {
        tracing::warn!(
            endpoint = %endpoint,
            timeout = true,
            timeout_ms = timeout.as_millis() as u64,
            "Upstream provider timed out"
        );
        ProxyError::UpstreamTimeout {
            endpoint,
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        tracing::warn!(
            endpoint = %endpoint,
            timeout = false,
            error = %err,
            "Upstream request failed"
        );
        ProxyError::UpstreamUnavailable {
            endpoint,
            reason: err.to_string(),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

//! Typed access to the proxy's HTTP endpoints.

use std::time::Duration;

use async_trait::async_trait;
use geojson::Feature;
use reqwest::Url;
use routeproxy_core::models::{LngLat, PlaceSuggestion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Route as returned by `POST /api/route`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance: f64,
    pub duration: f64,
    pub feature: Feature,
}

/// Body of `GET /`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

#[derive(Deserialize)]
struct GeocodeBody {
    coordinates: LngLat,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Proxy operations the coordinator depends on
#[async_trait]
pub trait ProxyApi: Send + Sync {
    async fn suggestions(
        &self,
        query: &str,
        proximity: Option<LngLat>,
    ) -> Result<Vec<PlaceSuggestion>>;

    async fn geocode(&self, location: &str) -> Result<LngLat>;

    async fn route(&self, start: LngLat, end: LngLat) -> Result<RouteSummary>;
}

/// [`ProxyApi`] over HTTP
pub struct HttpProxyApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpProxyApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ClientError::ConfigInvalid {
                key: "http_client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            base_url: config.api_url.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| ClientError::ConfigInvalid {
            key: "api_url".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Query the proxy's health endpoint
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.client.get(self.endpoint("health")?).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            });
        }
        response.json::<HealthStatus>().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "Calling proxy");

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProxyApi for HttpProxyApi {
    async fn suggestions(
        &self,
        query: &str,
        proximity: Option<LngLat>,
    ) -> Result<Vec<PlaceSuggestion>> {
        let body = match proximity {
            Some(p) => json!({ "query": query, "proximity": p }),
            None => json!({ "query": query }),
        };
        self.post_json("api/suggestions", body).await
    }

    async fn geocode(&self, location: &str) -> Result<LngLat> {
        let body: GeocodeBody = self
            .post_json("api/geocode", json!({ "location": location }))
            .await?;
        Ok(body.coordinates)
    }

    async fn route(&self, start: LngLat, end: LngLat) -> Result<RouteSummary> {
        self.post_json("api/route", json!({ "start": start, "end": end })).await
    }
}

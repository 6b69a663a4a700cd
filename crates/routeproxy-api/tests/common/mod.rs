//! Shared fixtures for router tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use geojson::Geometry;
use parking_lot::Mutex;
use routeproxy_api::{create_router, AppState};
use routeproxy_core::clock::ManualClock;
use routeproxy_core::config::ProxySettings;
use routeproxy_core::error::{ProxyError, Result};
use routeproxy_core::models::{LngLat, PlaceSuggestion, RouteResult, SuggestionQuery};
use routeproxy_core::ports::MapProvider;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

/// Canned provider that records how often each operation was called
#[derive(Default)]
pub struct FakeProvider {
    pub suggestions: Mutex<Option<Result<Vec<PlaceSuggestion>>>>,
    pub geocode: Mutex<Option<Result<Option<LngLat>>>>,
    pub routes: Mutex<Option<Result<Vec<RouteResult>>>>,
    pub suggest_calls: AtomicUsize,
    pub geocode_calls: AtomicUsize,
    pub directions_calls: AtomicUsize,
    pub last_query: Mutex<Option<SuggestionQuery>>,
}

impl FakeProvider {
    pub fn with_suggestions(suggestions: Vec<PlaceSuggestion>) -> Self {
        let provider = Self::default();
        *provider.suggestions.lock() = Some(Ok(suggestions));
        provider
    }

    pub fn with_routes(routes: Vec<RouteResult>) -> Self {
        let provider = Self::default();
        *provider.routes.lock() = Some(Ok(routes));
        provider
    }

    pub fn with_geocode(coords: Option<LngLat>) -> Self {
        let provider = Self::default();
        *provider.geocode.lock() = Some(Ok(coords));
        provider
    }

    pub fn failing_with(err: fn() -> ProxyError) -> Self {
        let provider = Self::default();
        *provider.suggestions.lock() = Some(Err(err()));
        *provider.geocode.lock() = Some(Err(err()));
        *provider.routes.lock() = Some(Err(err()));
        provider
    }

    pub fn suggest_calls(&self) -> usize {
        self.suggest_calls.load(Ordering::SeqCst)
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn directions_calls(&self) -> usize {
        self.directions_calls.load(Ordering::SeqCst)
    }
}

fn replay<T: Clone>(slot: &Mutex<Option<Result<T>>>) -> Result<T> {
    match &*slot.lock() {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(err)) => Err(clone_error(err)),
        None => Err(ProxyError::InvalidInput("no canned response".to_string())),
    }
}

fn clone_error(err: &ProxyError) -> ProxyError {
    match err {
        ProxyError::UpstreamError { endpoint, status } => {
            ProxyError::UpstreamError {
                endpoint: *endpoint,
                status: *status,
            }
        }
        ProxyError::UpstreamTimeout {
            endpoint,
            timeout_ms,
        } => {
            ProxyError::UpstreamTimeout {
                endpoint: *endpoint,
                timeout_ms: *timeout_ms,
            }
        }
        ProxyError::UpstreamUnavailable { endpoint, reason } => {
            ProxyError::UpstreamUnavailable {
                endpoint: *endpoint,
                reason: reason.clone(),
            }
        }
        other => ProxyError::Serialization(other.to_string()),
    }
}

#[async_trait]
impl MapProvider for FakeProvider {
    async fn suggest(&self, query: &SuggestionQuery, limit: usize) -> Result<Vec<PlaceSuggestion>> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock() = Some(query.clone());
        replay(&self.suggestions).map(|mut list| {
            list.truncate(limit);
            list
        })
    }

    async fn geocode(&self, _location: &str) -> Result<Option<LngLat>> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        replay(&self.geocode)
    }

    async fn directions(&self, _start: LngLat, _end: LngLat) -> Result<Vec<RouteResult>> {
        self.directions_calls.fetch_add(1, Ordering::SeqCst);
        replay(&self.routes)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Router, provider handle and clock for one test
pub struct TestApp {
    pub router: Router,
    pub provider: Arc<FakeProvider>,
    pub clock: ManualClock,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn new(provider: FakeProvider) -> Self {
        Self::with_settings(provider, ProxySettings::default())
    }

    pub fn with_settings(provider: FakeProvider, settings: ProxySettings) -> Self {
        let provider = Arc::new(provider);
        let clock = ManualClock::new();
        let state = Arc::new(AppState::with_clock(
            provider.clone(),
            settings,
            Arc::new(clock.clone()),
        ));
        let router = create_router(state.clone());
        Self {
            router,
            provider,
            clock,
            state,
        }
    }

    pub async fn post(&self, path: &str, body: JsonValue) -> (StatusCode, Response<Body>) {
        self.post_from(path, body, SocketAddr::from(([10, 0, 0, 1], 40000))).await
    }

    pub async fn post_from(
        &self,
        path: &str,
        body: JsonValue,
        peer: SocketAddr,
    ) -> (StatusCode, Response<Body>) {
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = self.router.clone().oneshot(request).await.unwrap();
        (response.status(), response)
    }

    /// POST a raw body with an optional content type
    pub async fn post_raw(
        &self,
        path: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Response<Body>) {
        let mut builder = Request::builder().method("POST").uri(path);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let mut request = builder.body(Body::from(body.to_string())).unwrap();
        request.extensions_mut().insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 40000))));

        let response = self.router.clone().oneshot(request).await.unwrap();
        (response.status(), response)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, JsonValue) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }
}

pub async fn body_json(response: Response<Body>) -> JsonValue {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn suggestion(id: &str, name: &str, lon: f64, lat: f64) -> PlaceSuggestion {
    PlaceSuggestion {
        id: id.to_string(),
        place_name: name.to_string(),
        center: LngLat::new(lon, lat).unwrap(),
    }
}

pub fn abid_suggestions() -> Vec<PlaceSuggestion> {
    vec![
        suggestion("place.1", "Abidjan, Côte d'Ivoire", -4.0083, 5.36),
        suggestion("poi.2", "Abidjan Mall, Cocody", -3.99, 5.35),
        suggestion("address.3", "Rue Abidjan, Bouaké", -5.03, 7.69),
    ]
}

pub fn line_geometry() -> Geometry {
    Geometry::new(geojson::Value::LineString(vec![
        vec![-4.02, 5.32],
        vec![-4.0, 5.33],
        vec![-3.98, 5.35],
    ]))
}

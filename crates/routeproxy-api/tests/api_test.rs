//! Router-level tests driven through `tower::ServiceExt::oneshot`

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use common::{abid_suggestions, body_json, line_geometry, FakeProvider, TestApp};
use routeproxy_core::config::ProxySettings;
use routeproxy_core::error::ProxyError;
use routeproxy_core::models::{LngLat, RouteResult, UpstreamEndpoint};
use serde_json::{json, Number};

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new(FakeProvider::default());

    for path in ["/", "/health"] {
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_abid_scenario_is_cached() {
    let app = TestApp::new(FakeProvider::with_suggestions(abid_suggestions()));

    let (status, response) = app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    assert_eq!(status, StatusCode::OK);
    let first = body_json(response).await;

    let items = first.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["id"], "place.1");
    assert_eq!(items[0]["place_name"], "Abidjan, Côte d'Ivoire");
    assert_eq!(items[0]["center"], json!([-4.0083, 5.36]));
    assert_eq!(items[2]["center"], json!([-5.03, 7.69]));
    assert_eq!(app.provider.suggest_calls(), 1);

    // Default proximity is used when none is supplied
    let query = app.provider.last_query.lock().clone().unwrap();
    assert_eq!(query.proximity, LngLat::new(-4.0083, 5.36).unwrap());

    app.clock.advance(Duration::from_secs(30));
    let (status, response) = app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(response).await, first);
    assert_eq!(app.provider.suggest_calls(), 1);
}

#[tokio::test]
async fn test_cache_key_normalizes_text_and_proximity() {
    let app = TestApp::new(FakeProvider::with_suggestions(abid_suggestions()));

    app.post("/api/suggestions", json!({ "query": "Abid", "proximity": [-4.0083, 5.36] })).await;
    app.post("/api/suggestions", json!({ "query": "  aBID ", "proximity": [-4.0081, 5.3604] }))
        .await;
    assert_eq!(app.provider.suggest_calls(), 1);

    app.post("/api/suggestions", json!({ "query": "Abid", "proximity": [-4.02, 5.36] })).await;
    assert_eq!(app.provider.suggest_calls(), 2);
}

#[tokio::test]
async fn test_expired_entry_triggers_fresh_fetch() {
    let app = TestApp::new(FakeProvider::with_suggestions(abid_suggestions()));

    app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    app.clock.advance(Duration::from_secs(60));
    let (status, _) = app.post("/api/suggestions", json!({ "query": "Abid" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.provider.suggest_calls(), 2);
}

#[tokio::test]
async fn test_short_query_returns_empty_without_upstream() {
    let app = TestApp::new(FakeProvider::with_suggestions(abid_suggestions()));

    for query in [json!({ "query": "A" }), json!({ "query": "   b  " }), json!({})] {
        let (status, response) = app.post("/api/suggestions", query).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }
    assert_eq!(app.provider.suggest_calls(), 0);
}

#[tokio::test]
async fn test_upstream_failures_map_to_status() {
    let app = TestApp::new(FakeProvider::failing_with(|| ProxyError::UpstreamError {
        endpoint: UpstreamEndpoint::Suggestions,
        status: 503,
    }));
    let (status, response) = app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body_json(response).await["error"].is_string());

    // Failures are not cached
    app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    assert_eq!(app.provider.suggest_calls(), 2);

    let app = TestApp::new(FakeProvider::failing_with(|| ProxyError::UpstreamTimeout {
        endpoint: UpstreamEndpoint::Suggestions,
        timeout_ms: 6_000,
    }));
    let (status, _) = app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_rate_limit_rejects_31st_request_then_recovers() {
    let app = TestApp::new(FakeProvider::with_suggestions(abid_suggestions()));

    for n in 1..=30u32 {
        let (status, response) = app.post("/api/suggestions", json!({ "query": "Abid" })).await;
        assert_eq!(status, StatusCode::OK, "request {} should pass", n);
        assert_eq!(response.headers()["ratelimit-limit"], "30");
        assert_eq!(response.headers()["ratelimit-remaining"], (30 - n).to_string().as_str());
    }

    let (status, response) = app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["ratelimit-remaining"], "0");
    assert_eq!(response.headers()["retry-after"], "10");
    assert!(body_json(response).await["error"].is_string());

    // Another client has its own budget
    let (status, _) = app
        .post_from(
            "/api/suggestions",
            json!({ "query": "Abid" }),
            SocketAddr::from(([10, 0, 0, 2], 1)),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    app.clock.advance(Duration::from_secs(10));
    let (status, _) = app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_only_applies_to_suggestions() {
    let settings = ProxySettings {
        rate_limit_max: 1,
        ..ProxySettings::default()
    };
    let app = TestApp::with_settings(
        FakeProvider::with_geocode(Some(LngLat::new(-4.02, 5.32).unwrap())),
        settings,
    );

    for _ in 0..3 {
        let (status, response) = app.post("/api/geocode", json!({ "location": "Plateau" })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.headers().get("ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn test_geocode_success() {
    let app = TestApp::new(FakeProvider::with_geocode(Some(LngLat::new(-4.02, 5.32).unwrap())));

    let (status, response) = app.post("/api/geocode", json!({ "location": "Plateau" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "coordinates": [-4.02, 5.32] }));
}

#[tokio::test]
async fn test_geocode_validation_and_not_found() {
    let app = TestApp::new(FakeProvider::with_geocode(None));

    for body in [json!({}), json!({ "location": "   " })] {
        let (status, _) = app.post("/api/geocode", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert_eq!(app.provider.geocode_calls(), 0);

    let (status, _) = app.post("/api/geocode", json!({ "location": "Atlantis" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.provider.geocode_calls(), 1);
}

#[tokio::test]
async fn test_route_scenario() {
    let route = RouteResult::new(Number::from(12345), Number::from(900), line_geometry());
    let app = TestApp::new(FakeProvider::with_routes(vec![
        route,
        RouteResult::new(Number::from(20000), Number::from(1500), line_geometry()),
    ]));

    let (status, response) = app
        .post("/api/route", json!({ "start": [-4.02, 5.32], "end": [-3.98, 5.35] }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["distance"].to_string(), "12345");
    assert_eq!(body["duration"].to_string(), "900");
    assert_eq!(body["feature"]["type"], "Feature");
    assert_eq!(body["feature"]["properties"]["distance"].to_string(), "12345");
    assert_eq!(body["feature"]["properties"]["duration"].to_string(), "900");
    assert_eq!(body["feature"]["geometry"], serde_json::to_value(line_geometry()).unwrap());
}

#[tokio::test]
async fn test_route_rejects_invalid_points_before_upstream() {
    let app = TestApp::new(FakeProvider::with_routes(vec![]));

    let bad_bodies = [
        json!({ "start": [-4.02], "end": [-3.98, 5.35] }),
        json!({ "start": [-4.02, 5.32, 1.0], "end": [-3.98, 5.35] }),
        json!({ "start": ["a", 5.32], "end": [-3.98, 5.35] }),
        json!({ "start": [-4.02, 5.32], "end": [-3.98, 95.0] }),
        json!({ "start": [-4.02, 5.32] }),
        json!({ "start": "here", "end": "there" }),
    ];

    for body in bad_bodies {
        let (status, response) = app.post("/api/route", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {} should be rejected", body);
        assert!(body_json(response).await["error"].is_string());
    }
    assert_eq!(app.provider.directions_calls(), 0);
}

#[tokio::test]
async fn test_route_without_results_is_not_found() {
    let app = TestApp::new(FakeProvider::with_routes(vec![]));

    let (status, _) = app
        .post("/api/route", json!({ "start": [-4.02, 5.32], "end": [-3.98, 5.35] }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.provider.directions_calls(), 1);
}

#[tokio::test]
async fn test_route_upstream_error_is_bad_gateway() {
    let app = TestApp::new(FakeProvider::failing_with(|| ProxyError::UpstreamError {
        endpoint: UpstreamEndpoint::Directions,
        status: 422,
    }));

    let (status, _) = app
        .post("/api/route", json!({ "start": [-4.02, 5.32], "end": [-3.98, 5.35] }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_sweep_purges_expired_state() {
    let app = TestApp::new(FakeProvider::with_suggestions(abid_suggestions()));
    app.post("/api/suggestions", json!({ "query": "Abid" })).await;
    assert_eq!(app.state.cache.len(), 1);
    assert_eq!(app.state.rate_limiter.tracked(), 1);

    app.clock.advance(Duration::from_secs(61));
    app.state.sweep();

    assert!(app.state.cache.is_empty());
    assert_eq!(app.state.rate_limiter.tracked(), 0);
}

#[tokio::test]
async fn test_wrongly_typed_field_is_bad_request_with_error_body() {
    let app = TestApp::new(FakeProvider::with_geocode(None));

    let (status, response) = app.post("/api/geocode", json!({ "location": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid JSON body");
    assert!(body["details"].as_str().unwrap().contains("location"));
    assert_eq!(app.provider.geocode_calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request_with_error_body() {
    let app = TestApp::new(FakeProvider::with_routes(Vec::new()));

    let cases = [
        (Some("application/json"), "{ not json"),
        (Some("text/plain"), r#"{"start":[-4.02,5.32],"end":[-3.98,5.35]}"#),
        (None, r#"{"start":[-4.02,5.32],"end":[-3.98,5.35]}"#),
    ];

    for (content_type, raw) in cases {
        let (status, response) = app.post_raw("/api/route", content_type, raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "content type {:?}", content_type);
        assert_eq!(body_json(response).await["error"], "Invalid JSON body");
    }
    assert_eq!(app.provider.directions_calls(), 0);
}

#[tokio::test]
async fn test_malformed_suggestion_body_still_counts_against_limit() {
    let app = TestApp::new(FakeProvider::with_suggestions(abid_suggestions()));

    let (status, response) =
        app.post_raw("/api/suggestions", Some("application/json"), "[1, 2]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["ratelimit-remaining"], "29");
    assert_eq!(body_json(response).await["error"], "Invalid JSON body");
}

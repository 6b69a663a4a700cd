use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    // Only autocomplete traffic is rate limited
    let suggestions = Router::new()
        .route("/api/suggestions", post(handlers::suggestions))
        .route_layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    Router::new()
        // Health
        .route("/", get(handlers::health_check))
        .route("/health", get(handlers::health_check))

        .route("/api/geocode", post(handlers::geocode))
        .route("/api/route", post(handlers::route))

        .merge(suggestions)
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::dto::{RouteRequest, RouteResponse};
use crate::error::ApiError;
use crate::services::RouteService;
use crate::state::AppState;

pub async fn route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    let Json(request) = payload?;

    tracing::info!(start = ?request.start, end = ?request.end, "Processing route request");

    let route = RouteService::execute(&state, &request).await?;

    Ok(Json(route))
}

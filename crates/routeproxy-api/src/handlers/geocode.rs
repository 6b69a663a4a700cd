use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::dto::{GeocodeRequest, GeocodeResponse};
use crate::error::ApiError;
use crate::services::GeocodeService;
use crate::state::AppState;

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GeocodeRequest>, JsonRejection>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let Json(request) = payload?;

    tracing::info!(location = ?request.location, "Processing geocode request");

    let coordinates = GeocodeService::execute(&state, &request).await?;

    Ok(Json(GeocodeResponse { coordinates }))
}

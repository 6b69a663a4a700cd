use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use routeproxy_core::models::PlaceSuggestion;

use crate::dto::SuggestionRequest;
use crate::error::ApiError;
use crate::services::SuggestionService;
use crate::state::AppState;

pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<Vec<PlaceSuggestion>>, ApiError> {
    let Json(request) = payload?;

    tracing::info!(
        query = %request.query,
        has_proximity = request.proximity.is_some(),
        "Processing suggestion request"
    );

    let suggestions = SuggestionService::execute(&state, &request).await?;

    Ok(Json(suggestions))
}

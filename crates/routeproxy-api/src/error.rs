use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use routeproxy_core::error::ProxyError;
use serde::Serialize;

/// Message returned with every 429, matching common rate-limit middleware
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn too_many_requests() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body");
        Self::bad_request("Invalid JSON body").with_details(rejection.body_text())
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match &err {
            ProxyError::InvalidInput(reason) => Self::bad_request(reason.clone()),
            ProxyError::NotFound(reason) => Self::not_found(reason.clone()),
            ProxyError::RateLimited { .. } => Self::too_many_requests(),
            ProxyError::UpstreamError { .. } => {
                Self::bad_gateway("Upstream provider error").with_details(err.to_string())
            }
            // Timeouts are reported as a generic server error; only the logs
            // tell them apart from other internal failures.
            ProxyError::UpstreamTimeout { .. } | ProxyError::UpstreamUnavailable { .. } => {
                Self::internal("Internal server error")
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                Self::internal("Internal server error")
            }
        }
    }
}

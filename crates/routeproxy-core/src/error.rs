//! Error types for routeproxy

use thiserror::Error;

use crate::models::UpstreamEndpoint;

#[derive(Debug, Error)]
pub enum ProxyError {
    // Caller errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // Upstream errors
    #[error("Upstream {endpoint} responded with status {status}")]
    UpstreamError {
        endpoint: UpstreamEndpoint,
        status: u16,
    },

    #[error("Upstream {endpoint} timed out after {timeout_ms}ms")]
    UpstreamTimeout {
        endpoint: UpstreamEndpoint,
        timeout_ms: u64,
    },

    #[error("Upstream {endpoint} unavailable: {reason}")]
    UpstreamUnavailable {
        endpoint: UpstreamEndpoint,
        reason: String,
    },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ProxyError {
    /// Whether the failure originated at the upstream provider
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ProxyError::UpstreamError { .. }
                | ProxyError::UpstreamTimeout { .. }
                | ProxyError::UpstreamUnavailable { .. }
        )
    }

    /// Whether the failure was an upstream deadline being exceeded
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProxyError::UpstreamTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

use thiserror::Error;

use crate::state::Field;

/// Client-side error type
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Missing configuration: {key} is not set")]
    ConfigMissing { key: String },

    #[error("Invalid configuration for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Request to proxy failed: {0}")]
    Transport(String),

    #[error("Proxy returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode proxy response: {0}")]
    Decode(String),

    #[error("Both start and end coordinates are required")]
    MissingCoordinates,

    #[error("Route request was superseded before it completed")]
    Superseded,

    #[error("No suggestion at index {index} for the {field} field ({available} available)")]
    NoSuchSuggestion {
        field: Field,
        index: usize,
        available: usize,
    },
}

impl ClientError {
    /// Status code returned by the proxy, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

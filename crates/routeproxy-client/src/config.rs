use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, Result};

pub const API_URL_ENV: &str = "ROUTEPROXY_API_URL";
pub const MAP_TOKEN_ENV: &str = "ROUTEPROXY_MAP_TOKEN";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the proxy (e.g., "http://localhost:5000")
    pub api_url: Url,

    /// Access token used by the map renderer
    pub map_token: String,

    /// Keystroke debounce interval
    pub debounce: Duration,
}

impl ClientConfig {
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

    /// Endpoint paths are joined onto `api_url`, so a path prefix such as
    /// `http://host/mapproxy` is kept by ending it with `/`
    pub fn new(api_url: &str, map_token: impl Into<String>) -> Result<Self> {
        let mut api_url = Url::parse(api_url).map_err(|e| ClientError::ConfigInvalid {
            key: API_URL_ENV.to_string(),
            reason: format!("'{}' is not a valid URL: {}", api_url, e),
        })?;

        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Ok(Self {
            api_url,
            map_token: map_token.into(),
            debounce: Self::DEFAULT_DEBOUNCE,
        })
    }

    /// Load from `ROUTEPROXY_API_URL` and `ROUTEPROXY_MAP_TOKEN`; both are required
    pub fn from_env() -> Result<Self> {
        let api_url = required(API_URL_ENV)?;
        let map_token = required(MAP_TOKEN_ENV)?;
        Self::new(&api_url, map_token)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ClientError::ConfigMissing {
            key: key.to_string(),
        })
}

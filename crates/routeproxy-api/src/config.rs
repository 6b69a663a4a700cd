use std::env;
use std::path::PathBuf;

use routeproxy_core::config::{CliConfigOverrides, LayeredConfig, ProxySettings};
use routeproxy_core::error::Result;

/// API server configuration resolved from file, environment and CLI layers
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub layers: LayeredConfig,
    pub settings: ProxySettings,
}

impl ApiConfig {
    /// Load configuration with precedence CLI > environment > file > defaults
    ///
    /// The file is taken from `config_path` or, failing that, from
    /// `ROUTEPROXY_CONFIG`.
    pub fn load(config_path: Option<PathBuf>, overrides: CliConfigOverrides) -> Result<Self> {
        let mut layers = LayeredConfig::with_defaults();

        let file = config_path.or_else(|| env::var("ROUTEPROXY_CONFIG").ok().map(PathBuf::from));
        if let Some(path) = file {
            tracing::info!(path = %path.display(), "Loading configuration file");
            layers = layers.load_from_file(&path)?;
        }

        let mut layers = layers.load_from_env();
        layers.update_from_cli(overrides);
        layers.validate()?;

        let settings = layers.settings();
        Ok(Self { layers, settings })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        Self::load(None, CliConfigOverrides::default())
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.settings.port)
    }

    pub fn has_api_key(&self) -> bool {
        self.settings.api_key.is_some()
    }
}

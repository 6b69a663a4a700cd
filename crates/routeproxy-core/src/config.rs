use crate::error::{ProxyError, Result};
use crate::models::{parse_lng_lat, LngLat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PROVIDER_URL: &str = "https://api.mapbox.com";
pub const DEFAULT_PROXIMITY: [f64; 2] = [-4.0083, 5.36];
pub const DEFAULT_SUGGESTION_LIMIT: usize = 7;
/// Upper bound for the cache TTL and the rate-limit window
pub const MAX_WINDOW_SECS: u64 = 86_400;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the proxy service
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub port: ConfigValue<u16>,
    pub api_key: ConfigValue<Option<String>>,
    pub provider_url: ConfigValue<String>,
    pub suggest_timeout_ms: ConfigValue<u64>,
    pub geocode_timeout_ms: ConfigValue<u64>,
    pub route_timeout_ms: ConfigValue<u64>,
    pub suggestion_limit: ConfigValue<usize>,
    pub cache_ttl_secs: ConfigValue<u64>,
    pub cache_max_entries: ConfigValue<usize>,
    pub rate_limit_max: ConfigValue<u32>,
    pub rate_limit_window_secs: ConfigValue<u64>,
    pub proximity: ConfigValue<LngLat>,
    pub country: ConfigValue<Option<String>>,
    pub language: ConfigValue<Option<String>>,
    pub cors_origin: ConfigValue<Option<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            port: ConfigValue::new(DEFAULT_PORT, ConfigSource::Default),
            api_key: ConfigValue::new(None, ConfigSource::Default),
            provider_url: ConfigValue::new(DEFAULT_PROVIDER_URL.to_string(), ConfigSource::Default),
            suggest_timeout_ms: ConfigValue::new(6_000, ConfigSource::Default),
            geocode_timeout_ms: ConfigValue::new(6_000, ConfigSource::Default),
            route_timeout_ms: ConfigValue::new(10_000, ConfigSource::Default),
            suggestion_limit: ConfigValue::new(DEFAULT_SUGGESTION_LIMIT, ConfigSource::Default),
            cache_ttl_secs: ConfigValue::new(60, ConfigSource::Default),
            cache_max_entries: ConfigValue::new(10_000, ConfigSource::Default),
            rate_limit_max: ConfigValue::new(30, ConfigSource::Default),
            rate_limit_window_secs: ConfigValue::new(10, ConfigSource::Default),
            proximity: ConfigValue::new(
                LngLat {
                    lon: DEFAULT_PROXIMITY[0],
                    lat: DEFAULT_PROXIMITY[1],
                },
                ConfigSource::Default,
            ),
            country: ConfigValue::new(None, ConfigSource::Default),
            language: ConfigValue::new(None, ConfigSource::Default),
            cors_origin: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ProxyError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ProxyError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let source = ConfigSource::File;

        if let Some(port) = file_config.port {
            self.port.update(port, source);
        }
        if let Some(api_key) = file_config.api_key {
            self.api_key.update(Some(api_key), source);
        }
        if let Some(provider_url) = file_config.provider_url {
            self.provider_url.update(provider_url, source);
        }
        if let Some(timeouts) = file_config.timeouts {
            if let Some(ms) = timeouts.suggest_ms {
                self.suggest_timeout_ms.update(ms, source);
            }
            if let Some(ms) = timeouts.geocode_ms {
                self.geocode_timeout_ms.update(ms, source);
            }
            if let Some(ms) = timeouts.route_ms {
                self.route_timeout_ms.update(ms, source);
            }
        }
        if let Some(limit) = file_config.suggestion_limit {
            self.suggestion_limit.update(limit, source);
        }
        if let Some(cache) = file_config.cache {
            if let Some(ttl) = cache.ttl_secs {
                self.cache_ttl_secs.update(ttl, source);
            }
            if let Some(max) = cache.max_entries {
                self.cache_max_entries.update(max, source);
            }
        }
        if let Some(rate_limit) = file_config.rate_limit {
            if let Some(max) = rate_limit.max_requests {
                self.rate_limit_max.update(max, source);
            }
            if let Some(window) = rate_limit.window_secs {
                self.rate_limit_window_secs.update(window, source);
            }
        }
        if let Some(proximity) = file_config.proximity {
            self.proximity.update(proximity, source);
        }
        if let Some(country) = file_config.country {
            self.country.update(Some(country), source);
        }
        if let Some(language) = file_config.language {
            self.language.update(Some(language), source);
        }
        if let Some(origin) = file_config.cors_origin {
            self.cors_origin.update(Some(origin), source);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    ///
    /// Unparseable values are logged and ignored so a typo never prevents
    /// startup.
    pub fn load_from_env(mut self) -> Self {
        let source = ConfigSource::Environment;

        if let Some(port) = env_parsed::<u16>("PORT") {
            self.port.update(port, source);
        }
        if let Some(api_key) = env_string("MAPBOX_API_KEY") {
            self.api_key.update(Some(api_key), source);
        }
        if let Some(url) = env_string("ROUTEPROXY_PROVIDER_URL") {
            self.provider_url.update(url, source);
        }
        if let Some(ms) = env_parsed::<u64>("ROUTEPROXY_SUGGEST_TIMEOUT_MS") {
            self.suggest_timeout_ms.update(ms, source);
        }
        if let Some(ms) = env_parsed::<u64>("ROUTEPROXY_GEOCODE_TIMEOUT_MS") {
            self.geocode_timeout_ms.update(ms, source);
        }
        if let Some(ms) = env_parsed::<u64>("ROUTEPROXY_ROUTE_TIMEOUT_MS") {
            self.route_timeout_ms.update(ms, source);
        }
        if let Some(limit) = env_parsed::<usize>("ROUTEPROXY_SUGGESTION_LIMIT") {
            self.suggestion_limit.update(limit, source);
        }
        if let Some(ttl) = env_parsed::<u64>("ROUTEPROXY_CACHE_TTL_SECS") {
            self.cache_ttl_secs.update(ttl, source);
        }
        if let Some(max) = env_parsed::<usize>("ROUTEPROXY_CACHE_MAX_ENTRIES") {
            self.cache_max_entries.update(max, source);
        }
        if let Some(max) = env_parsed::<u32>("ROUTEPROXY_RATE_LIMIT_MAX") {
            self.rate_limit_max.update(max, source);
        }
        if let Some(window) = env_parsed::<u64>("ROUTEPROXY_RATE_LIMIT_WINDOW_SECS") {
            self.rate_limit_window_secs.update(window, source);
        }
        if let Some(raw) = env_string("ROUTEPROXY_PROXIMITY") {
            match parse_lng_lat(&raw) {
                Ok(point) => self.proximity.update(point, source),
                Err(e) => tracing::warn!("Invalid ROUTEPROXY_PROXIMITY value '{}': {}", raw, e),
            }
        }
        if let Some(country) = env_string("ROUTEPROXY_COUNTRY") {
            self.country.update(Some(country), source);
        }
        if let Some(language) = env_string("ROUTEPROXY_LANGUAGE") {
            self.language.update(Some(language), source);
        }
        if let Some(origin) = env_string("ROUTEPROXY_CORS_ORIGIN") {
            self.cors_origin.update(Some(origin), source);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(port) = overrides.port {
            self.port.update(port, ConfigSource::Cli);
        }

        if let Some(provider_url) = overrides.provider_url {
            self.provider_url.update(provider_url, ConfigSource::Cli);
        }

        if let Some(proximity) = overrides.proximity {
            self.proximity.update(proximity, ConfigSource::Cli);
        }
    }

    /// Check values that would make the service misbehave
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("suggest_timeout_ms", self.suggest_timeout_ms.value),
            ("geocode_timeout_ms", self.geocode_timeout_ms.value),
            ("route_timeout_ms", self.route_timeout_ms.value),
            ("cache_ttl_secs", self.cache_ttl_secs.value),
            ("rate_limit_window_secs", self.rate_limit_window_secs.value),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ProxyError::ConfigInvalid {
                    key: key.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        let bounded = [
            ("cache_ttl_secs", self.cache_ttl_secs.value),
            ("rate_limit_window_secs", self.rate_limit_window_secs.value),
        ];
        for (key, value) in bounded {
            if value > MAX_WINDOW_SECS {
                return Err(ProxyError::ConfigInvalid {
                    key: key.to_string(),
                    reason: format!("{} exceeds the maximum of {} seconds", value, MAX_WINDOW_SECS),
                });
            }
        }

        if self.rate_limit_max.value == 0 {
            return Err(ProxyError::ConfigInvalid {
                key: "rate_limit_max".to_string(),
                reason: "must allow at least one request per window".to_string(),
            });
        }

        if self.suggestion_limit.value == 0 || self.suggestion_limit.value > 10 {
            return Err(ProxyError::ConfigInvalid {
                key: "suggestion_limit".to_string(),
                reason: format!("{} is outside 1..=10", self.suggestion_limit.value),
            });
        }

        if !self.provider_url.value.starts_with("http://")
            && !self.provider_url.value.starts_with("https://")
        {
            return Err(ProxyError::ConfigInvalid {
                key: "provider_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.provider_url.value),
            });
        }

        Ok(())
    }

    /// Resolve the layered values into plain settings
    pub fn settings(&self) -> ProxySettings {
        ProxySettings {
            port: self.port.value,
            api_key: self.api_key.value.clone(),
            provider_url: self.provider_url.value.clone(),
            suggest_timeout: Duration::from_millis(self.suggest_timeout_ms.value),
            geocode_timeout: Duration::from_millis(self.geocode_timeout_ms.value),
            route_timeout: Duration::from_millis(self.route_timeout_ms.value),
            suggestion_limit: self.suggestion_limit.value,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs.value),
            cache_max_entries: self.cache_max_entries.value,
            rate_limit_max: self.rate_limit_max.value,
            rate_limit_window: Duration::from_secs(self.rate_limit_window_secs.value),
            proximity: self.proximity.value,
            country: self.country.value.clone(),
            language: self.language.value.clone(),
            cors_origin: self.cors_origin.value.clone(),
        }
    }

    /// Get all configuration values as a map for inspection
    ///
    /// The API key is masked.
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("port".to_string(), (self.port.value.to_string(), self.port.source));
        map.insert(
            "api_key".to_string(),
            (mask_secret(self.api_key.value.as_deref()), self.api_key.source),
        );
        map.insert(
            "provider_url".to_string(),
            (self.provider_url.value.clone(), self.provider_url.source),
        );
        map.insert(
            "suggest_timeout_ms".to_string(),
            (self.suggest_timeout_ms.value.to_string(), self.suggest_timeout_ms.source),
        );
        map.insert(
            "geocode_timeout_ms".to_string(),
            (self.geocode_timeout_ms.value.to_string(), self.geocode_timeout_ms.source),
        );
        map.insert(
            "route_timeout_ms".to_string(),
            (self.route_timeout_ms.value.to_string(), self.route_timeout_ms.source),
        );
        map.insert(
            "suggestion_limit".to_string(),
            (self.suggestion_limit.value.to_string(), self.suggestion_limit.source),
        );
        map.insert(
            "cache_ttl_secs".to_string(),
            (self.cache_ttl_secs.value.to_string(), self.cache_ttl_secs.source),
        );
        map.insert(
            "cache_max_entries".to_string(),
            (self.cache_max_entries.value.to_string(), self.cache_max_entries.source),
        );
        map.insert(
            "rate_limit".to_string(),
            (
                format!(
                    "{} per {}s",
                    self.rate_limit_max.value, self.rate_limit_window_secs.value
                ),
                // Report whichever half was set with the higher precedence
                if self.rate_limit_max.source.precedence()
                    >= self.rate_limit_window_secs.source.precedence()
                {
                    self.rate_limit_max.source
                } else {
                    self.rate_limit_window_secs.source
                },
            ),
        );
        map.insert(
            "proximity".to_string(),
            (self.proximity.value.to_query_value(), self.proximity.source),
        );
        map.insert(
            "country".to_string(),
            (self.country.value.clone().unwrap_or_else(|| "-".to_string()), self.country.source),
        );
        map.insert(
            "language".to_string(),
            (self.language.value.clone().unwrap_or_else(|| "-".to_string()), self.language.source),
        );
        map.insert(
            "cors_origin".to_string(),
            (
                self.cors_origin.value.clone().unwrap_or_else(|| "*".to_string()),
                self.cors_origin.source,
            ),
        );

        map
    }
}

/// Plain, resolved settings handed to the service at construction
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub port: u16,
    pub api_key: Option<String>,
    pub provider_url: String,
    pub suggest_timeout: Duration,
    pub geocode_timeout: Duration,
    pub route_timeout: Duration,
    pub suggestion_limit: usize,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    pub proximity: LngLat,
    pub country: Option<String>,
    pub language: Option<String>,
    pub cors_origin: Option<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        LayeredConfig::with_defaults().settings()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    port: Option<u16>,
    api_key: Option<String>,
    provider_url: Option<String>,
    suggestion_limit: Option<usize>,
    proximity: Option<LngLat>,
    country: Option<String>,
    language: Option<String>,
    cors_origin: Option<String>,
    timeouts: Option<FileTimeouts>,
    cache: Option<FileCache>,
    rate_limit: Option<FileRateLimit>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FileTimeouts {
    suggest_ms: Option<u64>,
    geocode_ms: Option<u64>,
    route_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FileCache {
    ttl_secs: Option<u64>,
    max_entries: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FileRateLimit {
    max_requests: Option<u32>,
    window_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub port: Option<u16>,
    pub provider_url: Option<String>,
    pub proximity: Option<LngLat>,
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parsed<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env_string(key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Invalid {} value '{}': {}", key, raw, e);
            None
        }
    }
}

/// Mask a secret for display, keeping only the last four characters
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None => "(not set)".to_string(),
        Some(s) if s.chars().count() <= 4 => "****".to_string(),
        Some(s) => {
            let tail: String = s.chars().skip(s.chars().count() - 4).collect();
            format!("****{}", tail)
        }
    }
}

//! Command implementations

mod doctor;
mod geocode;
mod plan;
mod route;
mod suggest;

use anyhow::{Context, Result};
use routeproxy_client::{ClientConfig, HttpProxyApi};
use routeproxy_core::config::DEFAULT_PORT;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = resolve_config(cli.api_url.as_deref())?;
    let api = HttpProxyApi::new(&config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Suggest(args) => suggest::execute(args, &api, &output).await,
        Commands::Geocode(args) => geocode::execute(args, &api, &output).await,
        Commands::Route(args) => route::execute(args, &api, &output).await,
        Commands::Plan(args) => plan::execute(args, api, &config, &output).await,
        Commands::Doctor(args) => doctor::execute(args, &api, &output).await,
    }
}

/// Client configuration from the environment, falling back to a local proxy
///
/// Missing keys are logged and the CLI carries on with what it has; only the
/// map renderer needs the token.
fn resolve_config(api_url_override: Option<&str>) -> Result<ClientConfig> {
    let from_env = ClientConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Client configuration is incomplete");
        e
    });

    let config = match (api_url_override, from_env) {
        (Some(url), Ok(env_config)) => {
            ClientConfig::new(url, env_config.map_token)?.with_debounce(env_config.debounce)
        }
        (Some(url), Err(_)) => ClientConfig::new(url, String::new())?,
        (None, Ok(env_config)) => env_config,
        (None, Err(_)) => {
            let fallback = format!("http://localhost:{}", DEFAULT_PORT);
            tracing::warn!(api_url = %fallback, "Falling back to local proxy");
            ClientConfig::new(&fallback, String::new())?
        }
    };

    Ok(config)
}

/// Table row for a place suggestion
#[derive(Tabled, Serialize)]
pub struct SuggestionRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Place")]
    pub place_name: String,
    #[tabled(rename = "Center (lon, lat)")]
    pub center: String,
    #[tabled(rename = "ID")]
    pub id: String,
}

impl SuggestionRow {
    pub fn rows(suggestions: &[routeproxy_core::models::PlaceSuggestion]) -> Vec<Self> {
        suggestions
            .iter()
            .enumerate()
            .map(|(index, s)| Self {
                index,
                place_name: s.place_name.clone(),
                center: s.center.to_string(),
                id: s.id.clone(),
            })
            .collect()
    }
}

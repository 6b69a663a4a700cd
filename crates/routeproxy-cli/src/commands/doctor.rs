use std::env;
use std::path::PathBuf;

use anyhow::Result;
use console::style;
use routeproxy_client::config::{API_URL_ENV, MAP_TOKEN_ENV};
use routeproxy_client::{ClientConfig, HttpProxyApi};
use routeproxy_core::config::LayeredConfig;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::DoctorArgs;
use crate::output::OutputWriter;

#[derive(Tabled, Serialize)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub async fn execute(args: DoctorArgs, api: &HttpProxyApi, output: &OutputWriter) -> Result<()> {
    output.section("Route proxy health check");

    let mut checks_passed = 0;
    let mut total_checks = 0;

    // Client configuration
    total_checks += 1;
    match ClientConfig::from_env() {
        Ok(config) => {
            output.success(format!("Client config: proxy at {}", config.api_url));
            checks_passed += 1;
        }
        Err(e) => {
            output.error(format!("Client config: {}", e));
            output.info(format!("Set {} and {}", API_URL_ENV, MAP_TOKEN_ENV));
        }
    }

    // Proxy reachability
    total_checks += 1;
    match api.health().await {
        Ok(health) if health.status == "ok" => {
            output.success(format!("Proxy: {} ({})", health.message, api.base_url()));
            checks_passed += 1;
        }
        Ok(health) => {
            output.warning(format!("Proxy: unexpected status '{}'", health.status));
        }
        Err(e) => {
            output.error(format!("Proxy: unreachable at {}: {}", api.base_url(), e));
            output.info("Start it with: routeproxy-api");
        }
    }

    // Server-side configuration as it would resolve from this environment
    total_checks += 1;
    let layers = match env::var("ROUTEPROXY_CONFIG").ok().map(PathBuf::from) {
        Some(path) => LayeredConfig::with_defaults()
            .load_from_file(path)
            .map(|c| c.load_from_env()),
        None => Ok(LayeredConfig::with_defaults().load_from_env()),
    };

    match layers.and_then(|c| c.validate().map(|_| c)) {
        Ok(layers) => {
            if layers.api_key.value.is_some() {
                output.success("Server config: valid");
                checks_passed += 1;
            } else {
                output.warning("Server config: MAPBOX_API_KEY is not set");
            }

            if args.verbose {
                let mut rows: Vec<ConfigRow> = layers
                    .to_inspection_map()
                    .into_iter()
                    .map(|(key, (value, source))| ConfigRow {
                        key,
                        value,
                        source: format!("{:?}", source),
                    })
                    .collect();
                rows.sort_by(|a, b| a.key.cmp(&b.key));
                output.table(rows)?;
            }
        }
        Err(e) => output.error(format!("Server config: {}", e)),
    }

    if !output.is_json() {
        println!();
        let summary = format!("{}/{} checks passed", checks_passed, total_checks);
        if checks_passed == total_checks {
            println!("{}", style(summary).green().bold());
        } else {
            println!("{}", style(summary).yellow().bold());
        }
    }

    Ok(())
}

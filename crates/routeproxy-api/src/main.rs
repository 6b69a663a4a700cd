use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use routeproxy_core::config::CliConfigOverrides;
use routeproxy_core::models::parse_lng_lat;
use routeproxy_provider::{MapboxConfig, MapboxProvider};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routeproxy_api::state::{spawn_sweeper, AppState, SWEEP_INTERVAL};
use routeproxy_api::{create_router, ApiConfig};

/// Thin proxy in front of a Mapbox-compatible mapping provider
#[derive(Parser, Debug)]
#[command(name = "routeproxy-api")]
#[command(version, about)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// TOML configuration file (overrides ROUTEPROXY_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream provider base URL
    #[arg(long)]
    provider_url: Option<String>,

    /// Default proximity as "lon,lat"
    #[arg(long)]
    proximity: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routeproxy_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let proximity = args
        .proximity
        .as_deref()
        .map(parse_lng_lat)
        .transpose()
        .context("Invalid --proximity")?;

    let config = ApiConfig::load(
        args.config,
        CliConfigOverrides {
            port: args.port,
            provider_url: args.provider_url,
            proximity,
        },
    )
    .context("Failed to load configuration")?;

    if !config.has_api_key() {
        tracing::warn!(
            "MAPBOX_API_KEY is not set; upstream calls will be rejected by the provider"
        );
    }

    let settings = config.settings.clone();

    tracing::info!(
        port = settings.port,
        provider_url = %settings.provider_url,
        cache_ttl_secs = settings.cache_ttl.as_secs(),
        rate_limit_max = settings.rate_limit_max,
        rate_limit_window_secs = settings.rate_limit_window.as_secs(),
        "Starting route proxy"
    );

    let provider = MapboxProvider::new(MapboxConfig::from_settings(&settings))
        .context("Failed to initialize upstream provider")?;

    let state = Arc::new(AppState::new(Arc::new(provider), settings.clone()));
    spawn_sweeper(state.clone(), SWEEP_INTERVAL);

    let cors = build_cors(settings.cors_origin.as_deref())?;

    let app = create_router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server error")?;

    Ok(())
}

fn build_cors(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let allow_origin = match origin {
        Some(origin) => {
            let value = origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{}'", origin))?;
            tracing::info!("CORS enabled for {}", origin);
            AllowOrigin::exact(value)
        }
        None => AllowOrigin::any(),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

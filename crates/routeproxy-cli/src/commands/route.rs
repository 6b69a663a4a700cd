use anyhow::{Context, Result};
use geojson::Feature;
use routeproxy_client::{HttpProxyApi, ProxyApi};
use routeproxy_core::models::parse_lng_lat;

use crate::cli::RouteArgs;
use crate::output::{format_distance, format_duration, OutputWriter};

pub async fn execute(args: RouteArgs, api: &HttpProxyApi, output: &OutputWriter) -> Result<()> {
    let start = parse_lng_lat(&args.from).context("Invalid --from")?;
    let end = parse_lng_lat(&args.to).context("Invalid --to")?;

    let route = api.route(start, end).await?;
    print_summary(route.distance, route.duration, &route.feature, output)
}

pub(super) fn print_summary(
    distance: f64,
    duration: f64,
    feature: &Feature,
    output: &OutputWriter,
) -> Result<()> {
    if output.is_json() {
        return output.result(serde_json::json!({
            "distance": distance,
            "duration": duration,
            "feature": feature,
        }));
    }

    output.success(format!("{} in {}", format_distance(distance), format_duration(duration)));

    let points = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(geojson::Value::LineString(line)) => line.len(),
        _ => 0,
    };
    output.kv("Geometry points", points);
    Ok(())
}

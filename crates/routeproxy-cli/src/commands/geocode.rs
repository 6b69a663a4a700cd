use anyhow::Result;
use routeproxy_client::{HttpProxyApi, ProxyApi};

use crate::cli::GeocodeArgs;
use crate::output::OutputWriter;

pub async fn execute(args: GeocodeArgs, api: &HttpProxyApi, output: &OutputWriter) -> Result<()> {
    let coords = api.geocode(&args.location).await?;

    if output.is_json() {
        output.result(serde_json::json!({ "location": args.location, "coordinates": coords }))
    } else {
        output.kv(&args.location, coords);
        Ok(())
    }
}

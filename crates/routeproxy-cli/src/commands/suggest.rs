use anyhow::{Context, Result};
use routeproxy_client::{HttpProxyApi, ProxyApi};
use routeproxy_core::models::{parse_lng_lat, MIN_QUERY_CHARS};

use super::SuggestionRow;
use crate::cli::SuggestArgs;
use crate::output::OutputWriter;

pub async fn execute(args: SuggestArgs, api: &HttpProxyApi, output: &OutputWriter) -> Result<()> {
    let proximity = args
        .proximity
        .as_deref()
        .map(parse_lng_lat)
        .transpose()
        .context("Invalid --proximity")?;

    if args.query.trim().chars().count() < MIN_QUERY_CHARS {
        output.warning(format!(
            "Queries shorter than {} characters return no suggestions",
            MIN_QUERY_CHARS
        ));
    }

    let suggestions = api.suggestions(&args.query, proximity).await?;
    output.table(SuggestionRow::rows(&suggestions))
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use routeproxy_client::{
    ClientConfig, CoordinatorConfig, Field, HttpProxyApi, Notice, RequestCoordinator, UiState,
};
use tokio::sync::watch;

use super::SuggestionRow;
use crate::cli::PlanArgs;
use crate::output::OutputWriter;

/// Drive the coordinator the way a user filling in both fields would
pub async fn execute(
    args: PlanArgs,
    api: HttpProxyApi,
    config: &ClientConfig,
    output: &OutputWriter,
) -> Result<()> {
    let coordinator = RequestCoordinator::new(Arc::new(api), CoordinatorConfig::from(config));
    let mut updates = coordinator.subscribe();
    let wait = Duration::from_secs(args.wait_secs);

    for (field, text) in [(Field::Start, &args.from), (Field::End, &args.to)] {
        coordinator.focus(field);
        coordinator.edit(field, text.as_str());

        let state = wait_for_suggestions(&mut updates, field, text, wait).await?;
        let suggestions = &state.field(field).suggestions;

        if suggestions.is_empty() {
            report_notices(&coordinator, output);
            bail!("No suggestions for the {} address '{}'", field, text);
        }

        output.section(format!("{} suggestions", field));
        output.table(SuggestionRow::rows(suggestions))?;

        let chosen = coordinator.select(field, args.pick)?;
        output.info(format!("{}: {} ({})", field, chosen.place_name, chosen.center));
        coordinator.blur(field);
    }

    match coordinator.compute_route().await {
        Ok(view) => {
            output.section("Route");
            super::route::print_summary(
                view.distance_meters,
                view.duration_seconds,
                &view.feature,
                output,
            )?;
            let (min, max) = (view.bounds.min(), view.bounds.max());
            output.kv(
                "Viewport",
                format!("[{:.4}, {:.4}] - [{:.4}, {:.4}]", min.x, min.y, max.x, max.y),
            );
            Ok(())
        }
        Err(e) => {
            report_notices(&coordinator, output);
            Err(e.into())
        }
    }
}

/// Wait until the field has an answer for `text`, possibly empty, or failed
async fn wait_for_suggestions(
    updates: &mut watch::Receiver<UiState>,
    field: Field,
    text: &str,
    wait: Duration,
) -> Result<UiState> {
    let settled = |state: &UiState| {
        let failed = state.notices.contains(&Notice::SuggestionsUnavailable(field));
        failed || state.field(field).has_answer_for(text)
    };

    match tokio::time::timeout(wait, updates.wait_for(settled)).await {
        Ok(Ok(state)) => Ok(state.clone()),
        Ok(Err(_)) => bail!("Coordinator stopped"),
        Err(_) => bail!("Timed out waiting for {} suggestions", field),
    }
}

fn report_notices(coordinator: &RequestCoordinator, output: &OutputWriter) {
    for notice in coordinator.take_notices() {
        output.warning(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_answer_settles_wait() {
        let (tx, mut rx) = watch::channel(UiState::default());

        let mut answered = UiState::default();
        answered.start.text = "Nowhere".to_string();
        answered.start.suggestions_for = Some("Nowhere".to_string());
        tx.send_replace(answered);

        let state = wait_for_suggestions(&mut rx, Field::Start, "Nowhere", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(state.start.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_answer_for_older_text_does_not_settle() {
        let (tx, mut rx) = watch::channel(UiState::default());

        let mut stale = UiState::default();
        stale.start.suggestions_for = Some("Abid".to_string());
        tx.send_replace(stale);

        let result =
            wait_for_suggestions(&mut rx, Field::Start, "Abidjan", Duration::from_millis(50)).await;
        assert!(result.is_err());
    }
}

//! Best-effort startup work: fetches the configured bootstrap agent list
//! and registers whichever cards are reachable. A failed fetch is logged
//! and skipped — it must never block the gateway from serving.

use crate::state::AppState;

pub async fn run(state: &AppState) {
    let urls = &state.config.bootstrap.default_agents;
    if urls.is_empty() {
        tracing::info!("no bootstrap agents configured");
        return;
    }

    let mut registered = 0usize;
    for url in urls {
        match state.card_client.fetch(url).await {
            Ok(card) => {
                state.registry.add(card);
                registered += 1;
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "bootstrap agent fetch failed, skipping");
            }
        }
    }
    tracing::info!(
        attempted = urls.len(),
        registered,
        "bootstrap agent registration complete"
    );
}

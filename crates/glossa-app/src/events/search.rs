use std::sync::Arc;

use glossa_core::SearchEvent;
use glossa_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Pass aggregator output for the current query on to the UI
pub async fn forward_search_events(
    state: Arc<AppState>,
    search_rx: AsyncReceiver<SearchEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = search_rx.recv() => event?,
        };

        let Some(event) = state.session.lock().await.apply_search_event(event) else {
            continue;
        };
        app_to_ui_tx.send(to_app_event(event)).await?;
    }

    tracing::debug!("Search forwarder stopped");
    Ok(())
}

pub fn to_app_event(event: SearchEvent) -> AppEvent {
    match event {
        SearchEvent::ResultsUpdated { result, .. } => AppEvent::ShowResults(result),
        SearchEvent::SearchFinished { .. } => AppEvent::SearchFinished,
        SearchEvent::LookupFailed { reason, .. } => AppEvent::LookupFailed(reason.to_string()),
    }
}

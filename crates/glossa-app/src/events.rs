use std::ops::ControlFlow;
use std::sync::Arc;

use glossa_types::{AppEvent, UiEvent};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod navigation;
pub mod search;
pub mod text_input;

use navigation::handle_ui_event;
use text_input::handle_text_input;

/// App's main loop. Cancels `cancel` when the user asks to quit.
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    {
        let session = state.session.lock().await;
        navigation::publish_all(&session, &app_to_ui_tx).await?;
    }

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = ui_to_app_rx.recv() => event?,
        };

        tracing::debug!("[EVENT_LOOP] Event received: {:?}", event);
        if handle_events(&state, &app_to_ui_tx, event).await?.is_break() {
            tracing::info!("[EVENT_LOOP] Close requested");
            cancel.cancel();
            break;
        }
    }

    tracing::info!("[EVENT_LOOP] Stopped");
    Ok(())
}

async fn handle_events(
    state: &AppState,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<ControlFlow<()>> {
    match event {
        AppEvent::TextInput(text) => {
            handle_text_input(state, text).await;
        }
        AppEvent::UiEvent(UiEvent::Close) => return Ok(ControlFlow::Break(())),
        AppEvent::UiEvent(event) => {
            handle_ui_event(state, event, app_to_ui_tx).await?;
        }
        AppEvent::ConfigChanged => {
            let show_bar = state.config.read().await.ui.show_dictionary_bar;
            let mut session = state.session.lock().await;
            if session.set_dictionary_bar_visible(show_bar).is_some() {
                tracing::debug!("Dictionary bar now {}", if show_bar { "shown" } else { "hidden" });
            }
            app_to_ui_tx
                .send(AppEvent::StatusUpdate(session.status_line()))
                .await?;
        }
        // Output-side events, nothing to do here
        AppEvent::ShowResults(_)
        | AppEvent::SearchFinished
        | AppEvent::LookupFailed(_)
        | AppEvent::ShowArticle { .. }
        | AppEvent::ShowError { .. }
        | AppEvent::TabsChanged(_)
        | AppEvent::HistoryChanged(_)
        | AppEvent::StatusUpdate(_) => {}
    }

    Ok(ControlFlow::Continue(()))
}

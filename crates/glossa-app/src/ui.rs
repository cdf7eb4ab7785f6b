use std::fmt::Write as _;
use std::sync::Arc;

use glossa_config::Config;
use glossa_types::AppEvent;
use kanal::AsyncReceiver;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Prints everything the app sends to the UI side on stdout
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    config: Arc<RwLock<Config>>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => event?,
        };

        let limit = config.read().await.ui.word_list_limit;
        if let Some(text) = render(&event, limit) {
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

/// Text for one event, `None` for events with nothing to show
pub fn render(event: &AppEvent, word_list_limit: usize) -> Option<String> {
    let mut out = String::new();

    match event {
        AppEvent::ShowResults(result) => {
            if result.is_empty() && result.failures.is_empty() {
                return None;
            }
            let headwords = result.headwords();
            for (n, headword) in headwords.iter().take(word_list_limit).enumerate() {
                let _ = writeln!(out, "{:>3}. {}", n + 1, headword);
            }
            if headwords.len() > word_list_limit {
                let _ = writeln!(out, "     ... {} more", headwords.len() - word_list_limit);
            }
            for failure in &result.failures {
                let _ = writeln!(out, "  ! {}: {}", failure.dictionary, failure.reason);
            }
        }
        AppEvent::LookupFailed(reason) => {
            let _ = writeln!(out, "  (no results: {})", reason);
        }
        AppEvent::ShowArticle { tab, word, articles } => {
            let _ = writeln!(out, "== {} [{}] ==", word, tab);
            for article in articles {
                let _ = writeln!(out, "-- {} --", article.dictionary_name);
                let _ = writeln!(out, "{}: {}", article.headword, article.definition);
            }
        }
        AppEvent::ShowError { tab, word, reason } => {
            let _ = writeln!(out, "== {} [{}] == {}", word, tab, reason);
        }
        AppEvent::TabsChanged(tabs) => {
            let titles: Vec<String> = tabs
                .iter()
                .map(|tab| {
                    if tab.active {
                        format!("*{}:{}*", tab.id.0, tab.title)
                    } else {
                        format!("{}:{}", tab.id.0, tab.title)
                    }
                })
                .collect();
            let _ = writeln!(out, "tabs: {}", titles.join(" | "));
        }
        AppEvent::HistoryChanged(entries) => {
            if entries.is_empty() {
                let _ = writeln!(out, "history: empty");
            } else {
                let recent: Vec<String> = entries
                    .iter()
                    .enumerate()
                    .rev()
                    .take(5)
                    .map(|(n, entry)| format!("{}:{}", n + 1, entry.word))
                    .collect();
                let _ = writeln!(out, "history ({}): {}", entries.len(), recent.join(" "));
            }
        }
        AppEvent::StatusUpdate(status) => {
            let _ = writeln!(out, "[{}]", status);
        }
        AppEvent::SearchFinished
        | AppEvent::ConfigChanged
        | AppEvent::UiEvent(_)
        | AppEvent::TextInput(_) => return None,
    }

    Some(out)
}

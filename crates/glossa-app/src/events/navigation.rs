use anyhow::Context;
use glossa_core::{Session, ViewState};
use glossa_dictionary::load_paths;
use glossa_types::{AppEvent, DisplayArticle, TabId, UiEvent};
use kanal::AsyncSender;

use crate::state::AppState;

/// What a handled event changed, so only that is republished
#[derive(Debug, Default, Clone, Copy)]
struct Changes {
    view: bool,
    tabs: bool,
    history: bool,
    status: bool,
}

impl Changes {
    const VIEW: Changes = Changes {
        view: true,
        tabs: true,
        history: true,
        status: false,
    };
    const TABS: Changes = Changes {
        view: true,
        tabs: true,
        history: false,
        status: true,
    };
    const STATUS: Changes = Changes {
        view: false,
        tabs: false,
        history: false,
        status: true,
    };
}

pub async fn handle_ui_event(
    state: &AppState,
    event: UiEvent,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    if let UiEvent::RescanDictionaries = event {
        return rescan(state, app_to_ui_tx).await;
    }

    let mut session = state.session.lock().await;

    let changes = match event {
        UiEvent::SubmitInput => {
            session.submit_input().await;
            Changes::VIEW
        }
        UiEvent::ActivateMatch(index) => match session.activate_match(index).await {
            Some(_) => Changes::VIEW,
            None => return notify(app_to_ui_tx, format!("No match #{}", index + 1)).await,
        },
        UiEvent::OpenLink { word, target } => {
            session.open_link(&word, target).await;
            Changes::VIEW
        }
        UiEvent::ShowDefinitionInNewTab { word, group } => {
            session.show_definition_in_new_tab(&word, group).await;
            Changes::VIEW
        }
        UiEvent::Back => match session.back() {
            Some(_) => Changes::VIEW,
            None => return notify(app_to_ui_tx, "Nothing to go back to").await,
        },
        UiEvent::Forward => match session.forward() {
            Some(_) => Changes::VIEW,
            None => return notify(app_to_ui_tx, "Nothing to go forward to").await,
        },
        UiEvent::NewTab => {
            session.new_tab();
            Changes::TABS
        }
        UiEvent::CloseTab(id) => match session.close_tab(id) {
            Ok(true) => Changes::TABS,
            Ok(false) => return notify(app_to_ui_tx, "The last tab stays open").await,
            Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
        },
        UiEvent::CloseCurrentTab => {
            if !session.close_current_tab() {
                return notify(app_to_ui_tx, "The last tab stays open").await;
            }
            Changes::TABS
        }
        UiEvent::SwitchTab(id) => match session.switch_to(id) {
            Ok(()) => Changes::TABS,
            Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
        },
        UiEvent::NextTab => {
            session.switch_to_next_tab();
            Changes::TABS
        }
        UiEvent::PreviousTab => {
            session.switch_to_previous_tab();
            Changes::TABS
        }
        UiEvent::SelectGroup(group) => match session.select_group(group) {
            Ok(_) => Changes::STATUS,
            Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
        },
        UiEvent::MuteDictionary { dictionary, muted } => {
            match session.mute_dictionary(&dictionary, muted) {
                Ok(Some(_)) => Changes::STATUS,
                Ok(None) => {
                    return notify(app_to_ui_tx, format!("{} unchanged", dictionary)).await;
                }
                Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
            }
        }
        UiEvent::ToggleDictionaryBar(visible) => {
            session.set_dictionary_bar_visible(visible);
            Changes::STATUS
        }
        UiEvent::CreateGroup { name, dictionaries } => {
            match session.create_group(&name, &dictionaries) {
                Ok(id) => {
                    notify(app_to_ui_tx, format!("Created {} '{}'", id, name.trim())).await?;
                    Changes::STATUS
                }
                Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
            }
        }
        UiEvent::RenameGroup { group, name } => match session.rename_group(group, &name) {
            Ok(()) => Changes::STATUS,
            Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
        },
        UiEvent::SetGroupDictionaries {
            group,
            dictionaries,
        } => match session.set_membership(group, &dictionaries) {
            Ok(()) => Changes::STATUS,
            Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
        },
        UiEvent::DeleteGroup(group) => match session.delete_group(group) {
            Ok(_) => Changes::TABS,
            Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
        },
        UiEvent::SetFavorite { group, favorite } => {
            match session.set_favorite(group, favorite) {
                Ok(()) => {
                    let message = if favorite {
                        format!("{} is the default group", group)
                    } else {
                        format!("{} is no longer the default group", group)
                    };
                    return notify(app_to_ui_tx, message).await;
                }
                Err(e) => return notify(app_to_ui_tx, e.to_string()).await,
            }
        }
        UiEvent::CancelSearch => {
            session.cancel_search();
            return notify(app_to_ui_tx, "Search cancelled").await;
        }
        UiEvent::OpenHistoryEntry(index) => match session.open_history_entry(index).await {
            Some(_) => Changes::VIEW,
            None => return notify(app_to_ui_tx, format!("No history entry #{}", index + 1)).await,
        },
        UiEvent::ClearHistory => {
            session.clear_history();
            Changes {
                history: true,
                ..Changes::default()
            }
        }
        UiEvent::RescanDictionaries | UiEvent::Close => Changes::default(),
    };

    publish(&session, app_to_ui_tx, changes).await
}

/// Push the whole visible state, e.g. at startup
pub async fn publish_all(session: &Session, app_to_ui_tx: &AsyncSender<AppEvent>) -> anyhow::Result<()> {
    let everything = Changes {
        view: true,
        tabs: true,
        history: true,
        status: true,
    };
    publish(session, app_to_ui_tx, everything).await
}

async fn publish(
    session: &Session,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    changes: Changes,
) -> anyhow::Result<()> {
    if changes.view {
        if let Some(event) = view_event(session.tabs().active().id, session.current_view()) {
            app_to_ui_tx.send(event).await?;
        }
    }
    if changes.tabs {
        app_to_ui_tx
            .send(AppEvent::TabsChanged(session.tabs().summaries()))
            .await?;
    }
    if changes.history {
        app_to_ui_tx
            .send(AppEvent::HistoryChanged(session.history_entries()))
            .await?;
    }
    if changes.status {
        app_to_ui_tx
            .send(AppEvent::StatusUpdate(session.status_line()))
            .await?;
    }
    Ok(())
}

async fn notify(app_to_ui_tx: &AsyncSender<AppEvent>, message: impl Into<String>) -> anyhow::Result<()> {
    app_to_ui_tx
        .send(AppEvent::StatusUpdate(message.into()))
        .await?;
    Ok(())
}

async fn rescan(state: &AppState, app_to_ui_tx: &AsyncSender<AppEvent>) -> anyhow::Result<()> {
    let (enabled, paths) = {
        let config = state.config.read().await;
        (config.dictionary.enabled, config.dictionary.paths.clone())
    };

    let dictionaries = if enabled {
        tokio::task::spawn_blocking(move || load_paths(&paths))
            .await
            .context("Dictionary rescan task failed")?
    } else {
        tracing::warn!("Dictionaries disabled, rescan clears the registry");
        Vec::new()
    };

    let mut session = state.session.lock().await;
    let pruned = session.reload_dictionaries(dictionaries);
    session.refresh_view().await;

    publish(&session, app_to_ui_tx, Changes::TABS).await?;
    if pruned > 0 {
        notify(app_to_ui_tx, format!("{} group entries dropped", pruned)).await?;
    }
    Ok(())
}

pub fn view_event(tab: TabId, view: &ViewState) -> Option<AppEvent> {
    match view {
        ViewState::Idle => None,
        ViewState::ShowingWord { visit, articles } => Some(AppEvent::ShowArticle {
            tab,
            word: visit.word.clone(),
            articles: articles
                .iter()
                .map(|found| DisplayArticle {
                    dictionary: found.dictionary.clone(),
                    dictionary_name: found.dictionary_name.clone(),
                    headword: found.article.headword.clone(),
                    definition: found
                        .article
                        .definitions
                        .iter()
                        .map(|d| d.text.as_str())
                        .collect::<Vec<_>>()
                        .join("; "),
                })
                .collect(),
        }),
        ViewState::ShowingError { visit, reason } => Some(AppEvent::ShowError {
            tab,
            word: visit.word.clone(),
            reason: reason.to_string(),
        }),
    }
}

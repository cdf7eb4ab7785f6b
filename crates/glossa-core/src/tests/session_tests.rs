use std::time::Duration;

use glossa_config::{Config, SessionSnapshot};
use glossa_types::{DictionaryId, GroupId, LinkTarget};
use kanal::AsyncReceiver;
use tokio::time::timeout;

use crate::aggregator::{Query, SearchEvent};
use crate::error::{GroupError, LookupFailure};
use crate::navigation::ViewState;
use crate::registry::Registry;
use crate::session::Session;
use crate::tests::fakes::FakeDictionary;

fn registry() -> Registry {
    Registry::with_dictionaries([
        FakeDictionary::new("d1", &["cat", "catalog", "dog"]).shared(),
        FakeDictionary::new("d2", &["category", "cat"]).with_audio().shared(),
        FakeDictionary::new("d3", &["cow"]).shared(),
    ])
}

fn session_from(snapshot: SessionSnapshot) -> (Session, AsyncReceiver<SearchEvent>) {
    Session::new(Config::default(), registry(), snapshot)
}

fn session() -> (Session, AsyncReceiver<SearchEvent>) {
    session_from(SessionSnapshot::default())
}

fn ids(list: &[&str]) -> Vec<DictionaryId> {
    list.iter().map(|id| DictionaryId::new(*id)).collect()
}

fn shown(view: &ViewState) -> Option<String> {
    view.word().map(str::to_string)
}

/// Feed aggregator output into the session until `query` finishes
async fn settle(session: &mut Session, rx: &AsyncReceiver<SearchEvent>, query: &Query) {
    loop {
        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("search did not finish in time")
            .unwrap();
        if let Some(SearchEvent::SearchFinished { generation }) = session.apply_search_event(event) {
            if generation == query.generation {
                return;
            }
        }
    }
}

#[tokio::test]
async fn only_successful_visits_are_recorded() {
    let (mut session, _rx) = session();

    let view = session.navigate_to("cat", None).await.clone();
    let ViewState::ShowingWord { articles, .. } = &view else {
        panic!("expected articles, got {:?}", view);
    };
    let from: Vec<&str> = articles.iter().map(|a| a.dictionary.as_str()).collect();
    assert_eq!(from, vec!["d1", "d2"]);

    let view = session.navigate_to("zebra", None).await;
    assert!(matches!(
        view,
        ViewState::ShowingError {
            reason: LookupFailure::NoMatch,
            ..
        }
    ));
    assert_eq!(session.history().len(), 1);

    assert_eq!(session.back().and_then(shown), Some("cat".to_string()));
    assert_eq!(session.forward().and_then(shown), Some("zebra".to_string()));
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn blank_navigation_does_nothing() {
    let (mut session, _rx) = session();

    assert_eq!(session.navigate_to("   ", None).await, &ViewState::Idle);
    assert!(session.history().is_empty());
    assert!(session.back().is_none());
}

#[tokio::test]
async fn repeat_visits_append_to_history() {
    let (mut session, _rx) = session();
    session.navigate_to("cat", None).await;
    session.navigate_to("dog", None).await;

    let view = session.open_history_entry(0).await.cloned();

    assert_eq!(view.as_ref().and_then(shown), Some("cat".to_string()));
    let words: Vec<String> = session.history_entries().into_iter().map(|e| e.word).collect();
    assert_eq!(words, vec!["cat", "dog", "cat"]);
    assert!(session.open_history_entry(10).await.is_none());

    session.clear_history();
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn back_and_forward_are_per_tab() {
    let (mut session, _rx) = session();
    let first = session.tabs().active().id;
    session.navigate_to("cat", None).await;
    session.navigate_to("dog", None).await;

    session.new_tab();
    assert_eq!(session.current_view(), &ViewState::Idle);
    assert!(session.back().is_none());

    session.switch_to(first).unwrap();
    assert_eq!(shown(session.current_view()), Some("dog".to_string()));
    assert_eq!(session.back().and_then(shown), Some("cat".to_string()));
}

#[tokio::test]
async fn links_open_in_current_or_new_tab() {
    let (mut session, _rx) = session();
    let first = session.tabs().active().id;
    session.navigate_to("cat", None).await;

    let same = session.open_link("catalog", LinkTarget::CurrentTab).await;
    assert_eq!(same, first);
    assert_eq!(session.tabs().len(), 1);

    let opened = session.open_link("dog", LinkTarget::NewTab).await;
    assert_ne!(opened, first);
    assert_eq!(session.tabs().len(), 2);
    assert_eq!(session.tabs().active().id, opened);
    assert_eq!(session.tabs().active().title, "dog");
    assert!(session.back().is_none());

    session.switch_to(first).unwrap();
    assert_eq!(shown(session.current_view()), Some("catalog".to_string()));
    assert_eq!(session.back().and_then(shown), Some("cat".to_string()));
}

#[tokio::test]
async fn definition_in_new_tab_uses_given_group() {
    let (mut session, _rx) = session();
    let animals = session.create_group("Animals", &ids(&["d3"])).unwrap();

    let tab = session.show_definition_in_new_tab("cow", Some(animals)).await;

    assert_eq!(session.tabs().active().id, tab);
    assert_eq!(session.active_group(), Some(animals));
    let ViewState::ShowingWord { articles, .. } = session.current_view() else {
        panic!("cow should be found in d3");
    };
    assert_eq!(articles.len(), 1);
    assert_eq!(session.tabs().active().icon.as_deref(), Some("D3"));
}

#[tokio::test]
async fn group_restricts_lookup() {
    let (mut session, _rx) = session();
    let animals = session.create_group("Animals", &ids(&["d3"])).unwrap();

    let view = session.navigate_to("cat", Some(animals)).await;
    assert!(matches!(
        view,
        ViewState::ShowingError {
            reason: LookupFailure::NoMatch,
            ..
        }
    ));
}

#[tokio::test]
async fn deleting_a_group_moves_its_tabs_to_no_group() {
    let (mut session, _rx) = session();
    let group = session.create_group("English", &ids(&["d1", "d2"])).unwrap();
    session.select_group(Some(group)).unwrap();
    session.new_tab();

    assert_eq!(session.delete_group(group), Ok(2));
    assert_eq!(session.active_group(), None);
    assert!(session.tabs().iter().all(|tab| tab.group.is_none()));
    assert_eq!(session.delete_group(group), Err(GroupError::UnknownGroup(group)));
}

#[tokio::test]
async fn unknown_group_cannot_be_selected() {
    let (mut session, _rx) = session();
    assert_eq!(
        session.select_group(Some(GroupId(99))),
        Err(GroupError::UnknownGroup(GroupId(99)))
    );
    assert_eq!(session.active_group(), None);
}

#[tokio::test]
async fn muting_reissues_the_search() {
    let (mut session, rx) = session();
    let group = session.create_group("English", &ids(&["d1", "d2"])).unwrap();
    session.select_group(Some(group)).unwrap();
    let before = session.type_text("cat");

    let query = session
        .mute_dictionary(&"d1".into(), true)
        .unwrap()
        .expect("muting a member changes the active set");
    assert!(query.generation > before.generation);
    settle(&mut session, &rx, &query).await;

    let active: Vec<String> = session
        .active_dictionaries()
        .iter()
        .map(|d| d.id().to_string())
        .collect();
    assert_eq!(active, vec!["d2"]);
    assert!(session.results().entries.iter().all(|e| e.dictionary.as_str() == "d2"));

    assert_eq!(session.mute_dictionary(&"d3".into(), true), Ok(None));
    assert_eq!(session.mute_dictionary(&"d1".into(), true), Ok(None));
}

#[tokio::test]
async fn muting_needs_an_active_group() {
    let (mut session, _rx) = session();
    assert_eq!(
        session.mute_dictionary(&"d1".into(), true),
        Err(GroupError::NoActiveGroup)
    );
}

#[tokio::test]
async fn hiding_the_dictionary_bar_clears_mutes() {
    let (mut session, _rx) = session();
    let group = session.create_group("English", &ids(&["d1", "d2"])).unwrap();
    session.select_group(Some(group)).unwrap();
    session.mute_dictionary(&"d1".into(), true).unwrap();

    assert!(session.set_dictionary_bar_visible(false).is_some());
    assert!(!session.groups().is_muted(group, &"d1".into()));
    assert_eq!(session.active_dictionaries().len(), 2);

    assert!(session.set_dictionary_bar_visible(false).is_none());
    assert!(session.set_dictionary_bar_visible(true).is_none());
}

#[tokio::test]
async fn stale_events_are_filtered() {
    let (mut session, rx) = session();
    let first = session.type_text("ca");
    let second = session.type_text("cat");

    assert!(session
        .apply_search_event(SearchEvent::SearchFinished {
            generation: first.generation
        })
        .is_none());

    settle(&mut session, &rx, &second).await;
    assert_eq!(session.results().headwords(), vec!["cat", "catalog", "category"]);
}

#[tokio::test]
async fn activating_a_match_shows_it() {
    let (mut session, rx) = session();
    let query = session.type_text("cat");
    settle(&mut session, &rx, &query).await;

    let view = session.activate_match(2).await.cloned();
    assert_eq!(view.as_ref().and_then(shown), Some("category".to_string()));
    assert!(session.pronounce_available());
    assert_eq!(session.history().get(0).map(|e| e.word.as_str()), Some("category"));

    assert!(session.activate_match(50).await.is_none());
}

#[tokio::test]
async fn submit_shows_typed_word() {
    let (mut session, _rx) = session();
    session.type_text("  dog ");

    let view = session.submit_input().await;
    assert_eq!(shown(view), Some("dog".to_string()));
    assert!(!session.pronounce_available());
}

#[tokio::test]
async fn snapshot_restores_tabs_and_history() {
    let (mut session, _rx) = session();
    let animals = session.create_group("Animals", &ids(&["d3"])).unwrap();
    session.set_favorite(animals, true).unwrap();
    session.navigate_to("cat", None).await;
    session.new_tab();
    session.select_group(Some(animals)).unwrap();
    session.navigate_to("cow", Some(animals)).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.tabs.len(), 2);
    assert_eq!(snapshot.active_tab, 1);
    assert_eq!(snapshot.active_group, Some(animals));
    session.shutdown();

    let (mut restored, _rx) = session_from(snapshot.clone());
    restored.restore().await;

    let words: Vec<Option<&str>> = restored.tabs().iter().map(|tab| tab.word()).collect();
    assert_eq!(words, vec![Some("cat"), Some("cow")]);
    assert_eq!(restored.active_group(), Some(animals));
    assert_eq!(restored.history().len(), 2);
    assert_eq!(restored.groups().favorite().map(|g| g.id), Some(animals));
    assert_eq!(restored.snapshot().history, snapshot.history);
}

#[tokio::test]
async fn snapshot_with_unknown_group_falls_back() {
    let snapshot: SessionSnapshot = serde_json::from_str(
        r#"{ "active_group": 7, "tabs": [{ "word": "cat", "group": 7 }] }"#,
    )
    .unwrap();

    let (mut session, _rx) = session_from(snapshot);
    session.restore().await;

    assert_eq!(session.active_group(), None);
    assert_eq!(shown(session.current_view()), Some("cat".to_string()));
}

#[tokio::test]
async fn rescan_prunes_missing_dictionaries() {
    let (mut session, _rx) = session();
    let group = session.create_group("Mixed", &ids(&["d1", "d3"])).unwrap();

    let pruned = session.reload_dictionaries([
        FakeDictionary::new("d1", &["cat"]).shared(),
        FakeDictionary::new("d2", &["dog"]).shared(),
    ]);

    assert_eq!(pruned, 1);
    assert_eq!(session.groups().get(group).unwrap().dictionaries, ids(&["d1"]));
    assert_eq!(session.registry().len(), 2);
}

#[tokio::test]
async fn word_list_follows_the_active_tab() {
    let (mut session, rx) = session();
    let first = session.tabs().active().id;
    let query = session.type_text("cat");
    settle(&mut session, &rx, &query).await;

    session.new_tab();
    let query = session.type_text("dog");
    settle(&mut session, &rx, &query).await;
    assert_eq!(session.results().headwords(), vec!["dog"]);

    session.switch_to(first).unwrap();
    assert!(session.results().entries.is_empty());
    let query = session.current_query().cloned().expect("switching re-runs the search");
    settle(&mut session, &rx, &query).await;

    assert_eq!(session.results().headwords(), vec!["cat", "catalog", "category"]);
    let view = session.activate_match(1).await.cloned();
    assert_eq!(view.as_ref().and_then(shown), Some("catalog".to_string()));
}

#[tokio::test]
async fn cancel_drops_the_current_search() {
    let (mut session, rx) = session();
    session.type_text("cat");
    session.cancel_search();

    assert!(session.current_query().is_none());
    let late = timeout(Duration::from_millis(200), rx.recv()).await;
    if let Ok(Ok(event)) = late {
        assert!(session.apply_search_event(event).is_none());
    }
    assert!(session.results().entries.is_empty());
}

#[tokio::test]
async fn membership_change_reruns_the_active_search() {
    let (mut session, rx) = session();
    let group = session.create_group("English", &ids(&["d1"])).unwrap();
    let first = session.select_group(Some(group)).unwrap();
    session.type_text("cat");

    session.set_membership(group, &ids(&["d2"])).unwrap();
    let query = session.current_query().cloned().unwrap();
    assert!(query.generation > first.generation);
    settle(&mut session, &rx, &query).await;

    assert!(session.results().entries.iter().all(|e| e.dictionary.as_str() == "d2"));
    session.rename_group(group, "Second").unwrap();
    assert_eq!(session.status_line(), "Second: 1 of 3 dictionaries active");
}

#[tokio::test]
async fn status_line_names_the_group() {
    let (mut session, _rx) = session();
    assert_eq!(session.status_line(), "All: 3 of 3 dictionaries active");

    let group = session.create_group("English", &ids(&["d1", "d2"])).unwrap();
    session.select_group(Some(group)).unwrap();
    assert_eq!(session.status_line(), "English: 2 of 3 dictionaries active");
}

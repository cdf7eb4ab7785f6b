use std::sync::Arc;

use glossa_config::{Config, SessionSnapshot, TabSnapshot};
use glossa_types::{DictionaryId, GroupId, HistoryEntry, LinkTarget, MatchResult, TabId};
use kanal::AsyncReceiver;

use crate::aggregator::{Query, SearchAggregator, SearchEvent, SearchSettings};
use crate::dictionary::Dictionary;
use crate::error::{GroupError, TabError};
use crate::groups::Groups;
use crate::history::History;
use crate::lookup::{ArticleLookup, LookupOutcome};
use crate::navigation::{ViewState, Visit};
use crate::preprocess::{DefaultPreprocessor, Preprocessor};
use crate::registry::Registry;
use crate::tabs::TabManager;

/// Process-wide search state: dictionaries, groups, tabs and history
///
/// Built once at startup from the persisted snapshot and turned back into
/// one by [`Session::snapshot`] on shutdown.
pub struct Session {
    config: Config,
    registry: Registry,
    groups: Groups,
    tabs: TabManager,
    history: History,
    aggregator: SearchAggregator,
    lookup: ArticleLookup,
    current_query: Option<Query>,
    results: MatchResult,
    dictionary_bar_visible: bool,
    pending_restore: Vec<(TabId, Visit)>,
}

impl Session {
    /// Must be called inside a tokio runtime; spawns the search merge task
    pub fn new(
        config: Config,
        registry: Registry,
        snapshot: SessionSnapshot,
    ) -> (Self, AsyncReceiver<SearchEvent>) {
        let (aggregator, events) = SearchAggregator::spawn(SearchSettings::from(&config.search));
        let lookup = ArticleLookup::new(config.search.backend_timeout());

        let groups = Groups::from_config(&snapshot.groups, &snapshot.muted, &registry);
        let history = History::from_entries(snapshot.history, &config.history);
        let known = |group: Option<GroupId>| group.filter(|id| groups.get(*id).is_some());

        let default_group =
            known(snapshot.active_group).or_else(|| groups.favorite().map(|g| g.id));
        let mut tabs = TabManager::new(default_group);
        let mut pending_restore = Vec::new();

        for (index, saved) in snapshot.tabs.iter().enumerate() {
            let id = if index == 0 {
                tabs.active().id
            } else {
                tabs.create_tab(true)
            };
            let group = known(saved.group);
            tabs.active_mut().group = group;

            if let Some(word) = saved.word.as_deref().filter(|w| !w.trim().is_empty()) {
                tabs.active_mut().title = word.to_string();
                pending_restore.push((id, Visit::new(word, group)));
            }
        }

        let restored = tabs.iter().nth(snapshot.active_tab).map(|tab| tab.id);
        if let Some(id) = restored {
            if let Err(e) = tabs.switch_to(id) {
                tracing::warn!("Could not select restored tab: {}", e);
            }
        }

        tracing::info!(
            "Session ready: {} dictionaries, {} groups, {} tabs, {} history entries",
            registry.len(),
            groups.len(),
            tabs.len(),
            history.len()
        );

        let dictionary_bar_visible = config.ui.show_dictionary_bar;
        let session = Self {
            config,
            registry,
            groups,
            tabs,
            history,
            aggregator,
            lookup,
            current_query: None,
            results: MatchResult::default(),
            dictionary_bar_visible,
            pending_restore,
        };
        (session, events)
    }

    /// Re-open the words the persisted tabs were showing. Replays are not
    /// added to the history log.
    pub async fn restore(&mut self) {
        for (tab, visit) in std::mem::take(&mut self.pending_restore) {
            if let Err(e) = self.navigate_tab(tab, visit, false).await {
                tracing::warn!("Could not restore tab: {}", e);
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let (groups, muted) = self.groups.to_config();

        SessionSnapshot {
            groups,
            muted,
            history: self.history.to_vec(),
            active_group: self.active_group(),
            tabs: self
                .tabs
                .iter()
                .map(|tab| TabSnapshot {
                    word: tab.word().map(str::to_string),
                    group: tab.group,
                })
                .collect(),
            active_tab: self.tabs.active_index(),
        }
    }

    pub fn shutdown(&self) {
        self.aggregator.shutdown();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn active_group(&self) -> Option<GroupId> {
        self.tabs.active().group
    }

    /// Dictionaries a search in `group` would query, in priority order
    pub fn dictionaries_for(&self, group: Option<GroupId>) -> Vec<Arc<dyn Dictionary>> {
        let members = group.and_then(|id| self.groups.get(id));
        let mutes = group.and_then(|id| self.groups.mutes(id));
        self.registry.active_set_for(members, mutes)
    }

    pub fn active_dictionaries(&self) -> Vec<Arc<dyn Dictionary>> {
        self.dictionaries_for(self.active_group())
    }

    // Searching

    /// Keystroke in the active tab's input line
    pub fn type_text(&mut self, text: &str) -> Query {
        self.tabs.active_mut().input = text.to_string();
        self.refresh_search()
    }

    /// Re-run the active tab's input against its current dictionary set
    pub fn refresh_search(&mut self) -> Query {
        let tab = self.tabs.active();
        let group = tab.group;
        let text = tab.input.clone();

        let dictionaries = self.dictionaries_for(group);
        let query = self.aggregator.search(&text, group, &dictionaries);

        self.results = MatchResult::default();
        self.current_query = Some(query.clone());
        query
    }

    pub fn cancel_search(&mut self) {
        self.aggregator.cancel();
        self.current_query = None;
    }

    /// Filter aggregator output down to the query this session last issued.
    /// Returns the event when the UI should see it.
    pub fn apply_search_event(&mut self, event: SearchEvent) -> Option<SearchEvent> {
        let current = self.current_query.as_ref()?.generation;
        if event.generation() != current {
            tracing::debug!(
                "Ignoring search event for #{} (current #{})",
                event.generation(),
                current
            );
            return None;
        }

        if let SearchEvent::ResultsUpdated { result, .. } = &event {
            self.results = result.clone();
        }
        Some(event)
    }

    pub fn current_query(&self) -> Option<&Query> {
        self.current_query.as_ref()
    }

    /// Latest aggregate of the current query
    pub fn results(&self) -> &MatchResult {
        &self.results
    }

    // Navigation

    /// Look `word` up in the active tab and show it there
    pub async fn navigate_to(&mut self, word: &str, group: Option<GroupId>) -> &ViewState {
        let tab = self.tabs.active().id;
        let word = DefaultPreprocessor.process(word);

        if word.is_empty() {
            return self.tabs.active().navigation.current();
        }

        if let Err(e) = self.navigate_tab(tab, Visit::new(word, group), true).await {
            tracing::warn!("Navigation failed: {}", e);
        }
        self.tabs.active().navigation.current()
    }

    pub async fn open_link(&mut self, word: &str, target: LinkTarget) -> TabId {
        let group = self.active_group();
        let tab = match target {
            LinkTarget::CurrentTab => self.tabs.active().id,
            LinkTarget::NewTab => self.new_tab(),
        };

        self.navigate_to(word, group).await;
        tab
    }

    pub async fn show_definition_in_new_tab(
        &mut self,
        word: &str,
        group: Option<GroupId>,
    ) -> TabId {
        let tab = self.tabs.create_tab(true);
        self.tabs.active_mut().group = group.filter(|id| self.groups.get(*id).is_some());
        self.refresh_search();

        self.navigate_to(word, group).await;
        tab
    }

    /// Enter in the input line: show the typed word itself
    pub async fn submit_input(&mut self) -> &ViewState {
        let input = self.tabs.active().input.clone();
        let group = self.active_group();
        self.navigate_to(&input, group).await
    }

    /// A word list item was activated
    pub async fn activate_match(&mut self, index: usize) -> Option<&ViewState> {
        let word = self.results.headwords().get(index)?.to_string();
        let group = self.active_group();
        Some(self.navigate_to(&word, group).await)
    }

    pub async fn open_history_entry(&mut self, index: usize) -> Option<&ViewState> {
        let entry = self.history.get(index)?.clone();
        Some(self.navigate_to(&entry.word, entry.group).await)
    }

    pub fn back(&mut self) -> Option<&ViewState> {
        self.tabs.active_mut().navigation.back()
    }

    pub fn forward(&mut self) -> Option<&ViewState> {
        self.tabs.active_mut().navigation.forward()
    }

    pub fn current_view(&self) -> &ViewState {
        self.tabs.active().navigation.current()
    }

    /// Look the active tab's word up again, e.g. after a rescan or a mute
    /// change, without adding a back/forward step
    pub async fn refresh_view(&mut self) -> &ViewState {
        if let Some(visit) = self.current_view().visit().cloned() {
            let dictionaries = self.dictionaries_for(visit.group);
            let outcome = self.lookup.lookup(&visit.word, &dictionaries).await;
            self.tabs.active_mut().navigation.refresh(outcome);
        }
        self.current_view()
    }

    async fn navigate_tab(
        &mut self,
        id: TabId,
        visit: Visit,
        record: bool,
    ) -> Result<(), TabError> {
        let dictionaries = self.dictionaries_for(visit.group);
        let outcome = self.lookup.lookup(&visit.word, &dictionaries).await;

        let tab = self.tabs.get_mut(id).ok_or(TabError::UnknownTab(id))?;
        tab.title = visit.word.clone();
        tab.icon = match &outcome {
            LookupOutcome::Found(articles) => articles.first().map(|a| a.dictionary_name.clone()),
            LookupOutcome::Failed(_) => None,
        };

        let word = visit.word.clone();
        let group = visit.group;
        let success = tab.navigation.navigate_to(visit, outcome);
        tracing::debug!("{} shows '{}' (found: {})", id, word, success);

        if success && record {
            self.history.push(&word, group);
        }
        Ok(())
    }

    // Tabs
    //
    // The word list belongs to the active tab: whenever another tab becomes
    // active its own input is searched again.

    pub fn new_tab(&mut self) -> TabId {
        let id = self.tabs.create_tab(true);
        self.refresh_search();
        id
    }

    pub fn close_tab(&mut self, id: TabId) -> Result<bool, TabError> {
        let before = self.tabs.active().id;
        let closed = self.tabs.close_tab(id)?;
        self.follow_active_tab(before);
        Ok(closed)
    }

    pub fn close_current_tab(&mut self) -> bool {
        let before = self.tabs.active().id;
        let closed = self.tabs.close_current();
        self.follow_active_tab(before);
        closed
    }

    pub fn switch_to(&mut self, id: TabId) -> Result<(), TabError> {
        let before = self.tabs.active().id;
        self.tabs.switch_to(id)?;
        self.follow_active_tab(before);
        Ok(())
    }

    pub fn switch_to_next_tab(&mut self) -> TabId {
        let before = self.tabs.active().id;
        let id = self.tabs.switch_to_next();
        self.follow_active_tab(before);
        id
    }

    pub fn switch_to_previous_tab(&mut self) -> TabId {
        let before = self.tabs.active().id;
        let id = self.tabs.switch_to_previous();
        self.follow_active_tab(before);
        id
    }

    fn follow_active_tab(&mut self, before: TabId) {
        if self.tabs.active().id != before {
            self.refresh_search();
        }
    }

    pub fn set_anchor(&mut self, anchor: Option<String>) {
        self.tabs.active_mut().navigation.set_anchor(anchor);
    }

    // Groups

    pub fn create_group(
        &mut self,
        name: &str,
        dictionaries: &[DictionaryId],
    ) -> Result<GroupId, GroupError> {
        self.groups.create_group(name, dictionaries, &self.registry)
    }

    pub fn rename_group(&mut self, id: GroupId, name: &str) -> Result<(), GroupError> {
        self.groups.rename_group(id, name)
    }

    /// Replace a group's dictionaries; the search re-runs when the active
    /// tab uses the group
    pub fn set_membership(
        &mut self,
        id: GroupId,
        dictionaries: &[DictionaryId],
    ) -> Result<(), GroupError> {
        self.groups.set_membership(id, dictionaries, &self.registry)?;
        if self.active_group() == Some(id) {
            self.refresh_search();
        }
        Ok(())
    }

    pub fn set_favorite(&mut self, id: GroupId, favorite: bool) -> Result<(), GroupError> {
        self.groups.set_favorite(id, favorite)
    }

    /// Delete a group; tabs using it fall back to all dictionaries.
    /// Returns how many tabs were moved.
    pub fn delete_group(&mut self, id: GroupId) -> Result<usize, GroupError> {
        self.groups.delete_group(id)?;
        let was_active = self.active_group() == Some(id);
        let moved = self.tabs.reassign_group(id);
        if was_active {
            self.refresh_search();
        }
        if moved > 0 {
            tracing::info!("{} tabs moved off deleted {}", moved, id);
        }
        Ok(moved)
    }

    /// Change the active tab's group and re-run its search
    pub fn select_group(&mut self, group: Option<GroupId>) -> Result<Query, GroupError> {
        if let Some(id) = group {
            self.groups.get(id).ok_or(GroupError::UnknownGroup(id))?;
        }
        self.tabs.active_mut().group = group;
        Ok(self.refresh_search())
    }

    /// Mute or unmute a dictionary in the active group. A change re-runs
    /// the search and returns the new query.
    pub fn mute_dictionary(
        &mut self,
        dictionary: &DictionaryId,
        muted: bool,
    ) -> Result<Option<Query>, GroupError> {
        let group = self.active_group().ok_or(GroupError::NoActiveGroup)?;

        if self.groups.mute_dictionary(group, dictionary, muted)? {
            Ok(Some(self.refresh_search()))
        } else {
            Ok(None)
        }
    }

    pub fn dictionary_bar_visible(&self) -> bool {
        self.dictionary_bar_visible
    }

    /// Hiding the dictionary bar drops every mute overlay
    pub fn set_dictionary_bar_visible(&mut self, visible: bool) -> Option<Query> {
        if self.dictionary_bar_visible == visible {
            return None;
        }
        self.dictionary_bar_visible = visible;

        if visible {
            return None;
        }
        self.groups.reset_all_mutes();
        Some(self.refresh_search())
    }

    /// Swap in a freshly loaded dictionary set. Returns how many group
    /// references went stale.
    pub fn reload_dictionaries(
        &mut self,
        dictionaries: impl IntoIterator<Item = Arc<dyn Dictionary>>,
    ) -> usize {
        self.registry.load(dictionaries);
        let pruned = self.groups.prune(&self.registry);
        if pruned > 0 {
            tracing::info!("Pruned {} stale dictionary references", pruned);
        }
        self.refresh_search();
        pruned
    }

    // History

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.to_vec()
    }

    // Status

    /// Whether the word shown in the active tab has a pronunciation
    pub fn pronounce_available(&self) -> bool {
        match self.current_view() {
            ViewState::ShowingWord { articles, .. } => articles.iter().any(|a| a.has_audio),
            _ => false,
        }
    }

    pub fn status_line(&self) -> String {
        let group = self
            .active_group()
            .and_then(|id| self.groups.get(id))
            .map(|group| group.name.as_str())
            .unwrap_or("All");

        format!(
            "{}: {} of {} dictionaries active",
            group,
            self.active_dictionaries().len(),
            self.registry.len()
        )
    }
}

use glossa_types::GroupId;

use crate::error::LookupFailure;
use crate::lookup::{FoundArticle, LookupOutcome};

/// A (word, group) pair shown in a tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub word: String,
    pub group: Option<GroupId>,
}

impl Visit {
    pub fn new(word: impl Into<String>, group: Option<GroupId>) -> Self {
        Self {
            word: word.into(),
            group,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Idle,
    ShowingWord {
        visit: Visit,
        articles: Vec<FoundArticle>,
    },
    ShowingError {
        visit: Visit,
        reason: LookupFailure,
    },
}

impl ViewState {
    fn from_outcome(visit: Visit, outcome: LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Found(articles) => ViewState::ShowingWord { visit, articles },
            LookupOutcome::Failed(reason) => ViewState::ShowingError { visit, reason },
        }
    }

    pub fn visit(&self) -> Option<&Visit> {
        match self {
            ViewState::Idle => None,
            ViewState::ShowingWord { visit, .. } | ViewState::ShowingError { visit, .. } => {
                Some(visit)
            }
        }
    }

    pub fn word(&self) -> Option<&str> {
        self.visit().map(|visit| visit.word.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NavEntry {
    state: ViewState,
    anchor: Option<String>,
}

/// Per-tab back/forward list
///
/// `navigate_to` drops everything ahead of the cursor, the way a browser does
/// after going back and following a new link.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    entries: Vec<NavEntry>,
    cursor: usize,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a freshly looked-up word. Returns true when the visit succeeded
    /// and belongs in the global history log.
    pub fn navigate_to(&mut self, visit: Visit, outcome: LookupOutcome) -> bool {
        let success = outcome.is_found();

        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(NavEntry {
            state: ViewState::from_outcome(visit, outcome),
            anchor: None,
        });
        self.cursor = self.entries.len() - 1;

        success
    }

    /// Replace what the current entry shows without moving the cursor,
    /// e.g. after the dictionary set changed
    pub fn refresh(&mut self, outcome: LookupOutcome) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            if let Some(visit) = entry.state.visit().cloned() {
                entry.state = ViewState::from_outcome(visit, outcome);
            }
        }
    }

    pub fn current(&self) -> &ViewState {
        static IDLE: ViewState = ViewState::Idle;
        self.entries
            .get(self.cursor)
            .map(|entry| &entry.state)
            .unwrap_or(&IDLE)
    }

    pub fn can_go_back(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn back(&mut self) -> Option<&ViewState> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&ViewState> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn anchor(&self) -> Option<&str> {
        self.entries
            .get(self.cursor)
            .and_then(|entry| entry.anchor.as_deref())
    }

    pub fn set_anchor(&mut self, anchor: Option<String>) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.anchor = anchor;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Article;

    fn found(word: &str) -> LookupOutcome {
        LookupOutcome::Found(vec![FoundArticle {
            dictionary: "d1".into(),
            dictionary_name: "D1".to_string(),
            article: Article {
                headword: word.to_string(),
                definitions: vec![],
            },
            has_audio: false,
        }])
    }

    fn go(nav: &mut Navigation, word: &str) -> bool {
        nav.navigate_to(Visit::new(word, None), found(word))
    }

    #[test]
    fn starts_idle() {
        let mut nav = Navigation::new();
        assert_eq!(nav.current(), &ViewState::Idle);
        assert!(nav.back().is_none());
        assert!(nav.forward().is_none());
    }

    #[test]
    fn back_and_forward_restore_states() {
        let mut nav = Navigation::new();
        go(&mut nav, "a");
        go(&mut nav, "b");

        assert_eq!(nav.back().and_then(ViewState::word), Some("a"));
        assert_eq!(nav.forward().and_then(ViewState::word), Some("b"));
        assert!(nav.forward().is_none());
    }

    #[test]
    fn navigating_after_back_discards_forward_path() {
        let mut nav = Navigation::new();
        go(&mut nav, "a");
        go(&mut nav, "b");
        nav.back();
        go(&mut nav, "c");

        assert!(!nav.can_go_forward());
        assert_eq!(nav.len(), 2);
        assert_eq!(nav.back().and_then(ViewState::word), Some("a"));
        assert_eq!(nav.forward().and_then(ViewState::word), Some("c"));
    }

    #[test]
    fn failed_lookup_shows_error_and_is_not_recorded() {
        let mut nav = Navigation::new();
        let recorded = nav.navigate_to(
            Visit::new("zzz", None),
            LookupOutcome::Failed(LookupFailure::NoMatch),
        );

        assert!(!recorded);
        assert!(matches!(
            nav.current(),
            ViewState::ShowingError {
                reason: LookupFailure::NoMatch,
                ..
            }
        ));
        assert!(go(&mut nav, "a"));
        assert_eq!(nav.back().and_then(ViewState::word), Some("zzz"));
    }

    #[test]
    fn anchor_belongs_to_its_entry() {
        let mut nav = Navigation::new();
        go(&mut nav, "a");
        nav.set_anchor(Some("sense-2".to_string()));
        go(&mut nav, "b");

        assert_eq!(nav.anchor(), None);
        nav.back();
        assert_eq!(nav.anchor(), Some("sense-2"));
    }

    #[test]
    fn refresh_keeps_cursor_and_visit() {
        let mut nav = Navigation::new();
        go(&mut nav, "a");

        nav.refresh(LookupOutcome::Failed(LookupFailure::BackendUnavailable));

        assert_eq!(nav.len(), 1);
        assert_eq!(nav.current().word(), Some("a"));
        assert!(matches!(nav.current(), ViewState::ShowingError { .. }));
    }
}

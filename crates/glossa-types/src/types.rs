use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of a loaded dictionary backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DictionaryId(pub String);

impl DictionaryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DictionaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DictionaryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// How closely a headword matches the query, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchRank {
    Exact,
    Prefix,
    Substring,
    /// Returned by the backend but not containing the query at all
    Fuzzy,
}

impl MatchRank {
    /// Case-insensitive classification of `headword` against `query`
    pub fn classify(query: &str, headword: &str) -> Self {
        let query = query.to_lowercase();
        let headword = headword.to_lowercase();

        if headword == query {
            MatchRank::Exact
        } else if headword.starts_with(&query) {
            MatchRank::Prefix
        } else if headword.contains(&query) {
            MatchRank::Substring
        } else {
            MatchRank::Fuzzy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub dictionary: DictionaryId,
    pub headword: String,
    pub rank: MatchRank,
}

/// A dictionary that failed to answer for one query generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFailure {
    pub dictionary: DictionaryId,
    pub reason: String,
}

/// Aggregated matches, grouped by dictionary in group order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entries: Vec<MatchEntry>,
    pub failures: Vec<BackendFailure>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn for_dictionary<'a>(
        &'a self,
        dictionary: &'a DictionaryId,
    ) -> impl Iterator<Item = &'a MatchEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| &entry.dictionary == dictionary)
    }

    /// Headwords for the word list: first occurrence wins, so a word shared by
    /// several dictionaries appears at the position of the highest-priority one
    pub fn headwords(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|entry| seen.insert(entry.headword.as_str()))
            .map(|entry| entry.headword.as_str())
            .collect()
    }

    /// Pairs in display order, handy for logging and assertions
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.dictionary.as_str(), entry.headword.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub word: String,
    pub group: Option<GroupId>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn now(word: impl Into<String>, group: Option<GroupId>) -> Self {
        Self {
            word: word.into(),
            group,
            timestamp: Utc::now(),
        }
    }
}

/// One dictionary's article as handed to the UI
#[derive(Debug, Clone)]
pub struct DisplayArticle {
    pub dictionary: DictionaryId,
    pub dictionary_name: String,
    pub headword: String,
    pub definition: String,
}

#[derive(Debug, Clone)]
pub struct TabSummary {
    pub id: TabId,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    CurrentTab,
    NewTab,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    ConfigChanged,
    UiEvent(UiEvent),
    TextInput(String),
    ShowResults(MatchResult),
    SearchFinished,
    LookupFailed(String),
    ShowArticle {
        tab: TabId,
        word: String,
        articles: Vec<DisplayArticle>,
    },
    ShowError {
        tab: TabId,
        word: String,
        reason: String,
    },
    TabsChanged(Vec<TabSummary>),
    HistoryChanged(Vec<HistoryEntry>),
    StatusUpdate(String),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Enter pressed in the input line
    SubmitInput,
    /// Word list item activated
    ActivateMatch(usize),
    OpenLink {
        word: String,
        target: LinkTarget,
    },
    ShowDefinitionInNewTab {
        word: String,
        group: Option<GroupId>,
    },
    Back,
    Forward,
    NewTab,
    CloseTab(TabId),
    CloseCurrentTab,
    SwitchTab(TabId),
    NextTab,
    PreviousTab,
    SelectGroup(Option<GroupId>),
    MuteDictionary {
        dictionary: DictionaryId,
        muted: bool,
    },
    ToggleDictionaryBar(bool),
    CreateGroup {
        name: String,
        dictionaries: Vec<DictionaryId>,
    },
    RenameGroup {
        group: GroupId,
        name: String,
    },
    SetGroupDictionaries {
        group: GroupId,
        dictionaries: Vec<DictionaryId>,
    },
    DeleteGroup(GroupId),
    SetFavorite {
        group: GroupId,
        favorite: bool,
    },
    /// Esc: drop the running search
    CancelSearch,
    OpenHistoryEntry(usize),
    ClearHistory,
    RescanDictionaries,
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_orders_exact_prefix_substring() {
        assert_eq!(MatchRank::classify("cat", "Cat"), MatchRank::Exact);
        assert_eq!(MatchRank::classify("cat", "catalog"), MatchRank::Prefix);
        assert_eq!(MatchRank::classify("cat", "bobcat"), MatchRank::Substring);
        assert_eq!(MatchRank::classify("cat", "kitten"), MatchRank::Fuzzy);
        assert!(MatchRank::Exact < MatchRank::Prefix);
        assert!(MatchRank::Substring < MatchRank::Fuzzy);
    }

    #[test]
    fn headwords_keep_first_occurrence() {
        let entry = |dict: &str, word: &str| MatchEntry {
            dictionary: dict.into(),
            headword: word.to_string(),
            rank: MatchRank::Prefix,
        };
        let result = MatchResult {
            entries: vec![entry("d1", "cat"), entry("d1", "catalog"), entry("d2", "cat")],
            failures: vec![],
        };

        assert_eq!(result.headwords(), vec!["cat", "catalog"]);
        assert_eq!(result.for_dictionary(&"d2".into()).count(), 1);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&(DictionaryId::new("wn"), GroupId(3))).unwrap();
        assert_eq!(json, r#"["wn",3]"#);
    }
}

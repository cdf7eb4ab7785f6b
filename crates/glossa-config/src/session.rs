use glossa_types::{DictionaryId, GroupId, HistoryEntry};
use serde::{Deserialize, Serialize};

/// Persisted shape of a user-defined dictionary group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub dictionaries: Vec<DictionaryId>,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutedDictionaries {
    pub group: GroupId,
    pub dictionaries: Vec<DictionaryId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub word: Option<String>,
    pub group: Option<GroupId>,
}

/// Everything needed to rebuild a session on the next start
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub groups: Vec<GroupConfig>,
    pub muted: Vec<MutedDictionaries>,
    pub history: Vec<HistoryEntry>,
    pub active_group: Option<GroupId>,
    pub tabs: Vec<TabSnapshot>,
    pub active_tab: usize,
}

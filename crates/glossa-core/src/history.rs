use std::collections::VecDeque;

use glossa_config::history::HistoryConfig;
use glossa_types::{GroupId, HistoryEntry};

/// Global log of visited words, oldest first, capped in size
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
    enabled: bool,
}

impl History {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
            enabled: true,
        }
    }

    /// Restore a persisted log, keeping only the newest `max_entries`
    pub fn from_entries(entries: Vec<HistoryEntry>, config: &HistoryConfig) -> Self {
        let mut history = Self::new(config.max_entries);
        history.enabled = config.enabled;
        history.entries = entries.into();
        history.evict();
        history
    }

    /// Append a visit. Returns false when recording is off.
    pub fn push(&mut self, word: &str, group: Option<GroupId>) -> bool {
        if !self.enabled || self.max_entries == 0 {
            return false;
        }

        self.entries.push_back(HistoryEntry::now(word, group));
        self.evict();
        true
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Entry by position, oldest first
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
        self.evict();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    fn evict(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }
}

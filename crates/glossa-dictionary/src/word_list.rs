use std::collections::{BTreeMap, HashSet};

use glossa_core::dictionary::{Article, Capabilities, Definition, Dictionary, DictionaryMetadata};
use glossa_core::error::BackendError;
use glossa_types::DictionaryId;

use crate::types::DictEntry;

/// In-memory dictionary over a list of entries
///
/// Headwords are indexed case-insensitively. In prefix mode a search returns
/// prefix hits in index order followed by substring hits in entry order.
pub struct WordListDictionary {
    id: DictionaryId,
    name: String,
    exact_only: bool,
    entries: Vec<DictEntry>,
    index: BTreeMap<String, Vec<usize>>,
}

impl WordListDictionary {
    pub fn new(id: impl Into<DictionaryId>, name: &str, entries: Vec<DictEntry>) -> Self {
        let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, entry) in entries.iter().enumerate() {
            index
                .entry(entry.headword.to_lowercase())
                .or_default()
                .push(position);
        }

        Self {
            id: id.into(),
            name: name.to_string(),
            exact_only: false,
            entries,
            index,
        }
    }

    /// Entries with a single generic definition each
    pub fn from_words(id: impl Into<DictionaryId>, name: &str, words: &[&str]) -> Self {
        let entries = words
            .iter()
            .map(|word| DictEntry::new(word, &[word]))
            .collect();
        Self::new(id, name, entries)
    }

    pub fn exact_only(mut self) -> Self {
        self.exact_only = true;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, headword: &str) -> impl Iterator<Item = &DictEntry> {
        self.index
            .get(&headword.to_lowercase())
            .into_iter()
            .flatten()
            .map(|&position| &self.entries[position])
    }
}

impl Dictionary for WordListDictionary {
    fn id(&self) -> &DictionaryId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            prefix_match: !self.exact_only,
            fetch_article: true,
            audio: self.entries.iter().any(|entry| entry.audio),
        }
    }

    fn match_prefix(&self, text: &str, max_results: usize) -> Result<Vec<String>, BackendError> {
        let key = text.to_lowercase();
        if key.is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }

        if self.exact_only {
            return Ok(self
                .lookup(text)
                .next()
                .map(|entry| entry.headword.clone())
                .into_iter()
                .collect());
        }

        let mut seen = HashSet::new();
        let mut matches: Vec<String> = self
            .index
            .range(key.clone()..)
            .take_while(|(headword, _)| headword.starts_with(&key))
            .flat_map(|(_, positions)| positions.iter())
            .map(|&position| self.entries[position].headword.clone())
            .filter(|headword| seen.insert(headword.clone()))
            .take(max_results)
            .collect();

        if matches.len() < max_results {
            let rest = max_results - matches.len();
            matches.extend(
                self.entries
                    .iter()
                    .map(|entry| &entry.headword)
                    .filter(|headword| {
                        let lower = headword.to_lowercase();
                        !lower.starts_with(&key) && lower.contains(&key)
                    })
                    .filter(|headword| seen.insert((*headword).clone()))
                    .take(rest)
                    .cloned(),
            );
        }

        Ok(matches)
    }

    fn fetch_article(&self, headword: &str) -> Result<Article, BackendError> {
        let mut found = self.lookup(headword).peekable();
        let Some(first) = found.peek() else {
            return Err(BackendError::NotFound(headword.to_string()));
        };
        let headword = first.headword.clone();

        let definitions = found
            .flat_map(|entry| {
                entry.definitions.iter().map(|text| Definition {
                    text: text.clone(),
                    part_of_speech: entry.pos.clone(),
                })
            })
            .collect();

        Ok(Article {
            headword,
            definitions,
        })
    }

    fn has_audio(&self, headword: &str) -> bool {
        self.lookup(headword).any(|entry| entry.audio)
    }

    fn metadata(&self) -> DictionaryMetadata {
        DictionaryMetadata {
            name: self.name.clone(),
            entry_count: Some(self.entries.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animals() -> WordListDictionary {
        WordListDictionary::from_words(
            "animals",
            "Animals",
            &["category", "Cat", "bobcat", "catalog", "dog", "cat"],
        )
    }

    #[test]
    fn prefix_hits_come_before_substring_hits() {
        let found = animals().match_prefix("cat", 10).unwrap();
        assert_eq!(found, vec!["Cat", "cat", "catalog", "category", "bobcat"]);
    }

    #[test]
    fn max_results_is_respected() {
        assert_eq!(animals().match_prefix("cat", 2).unwrap().len(), 2);
        assert!(animals().match_prefix("cat", 0).unwrap().is_empty());
    }

    #[test]
    fn empty_text_matches_nothing() {
        assert!(animals().match_prefix("", 10).unwrap().is_empty());
    }

    #[test]
    fn exact_only_answers_at_most_one() {
        let dictionary = animals().exact_only();

        assert!(!dictionary.capabilities().prefix_match);
        assert_eq!(dictionary.match_prefix("CAT", 10).unwrap(), vec!["Cat"]);
        assert!(dictionary.match_prefix("ca", 10).unwrap().is_empty());
    }

    #[test]
    fn article_merges_same_headword_entries() {
        let dictionary = WordListDictionary::new(
            "d",
            "D",
            vec![
                DictEntry::new("bank", &["side of a river"]),
                DictEntry::new("Bank", &["financial institution"]),
            ],
        );

        let article = dictionary.fetch_article("BANK").unwrap();
        assert_eq!(article.headword, "bank");
        assert_eq!(article.definitions.len(), 2);
    }

    #[test]
    fn missing_article_is_not_found() {
        assert_eq!(
            animals().fetch_article("zebra"),
            Err(BackendError::NotFound("zebra".to_string()))
        );
    }

    #[test]
    fn audio_is_per_entry() {
        let mut entry = DictEntry::new("cat", &["feline"]);
        entry.audio = true;
        let dictionary =
            WordListDictionary::new("d", "D", vec![entry, DictEntry::new("dog", &["canine"])]);

        assert!(dictionary.capabilities().audio);
        assert!(dictionary.has_audio("Cat"));
        assert!(!dictionary.has_audio("dog"));
        assert_eq!(dictionary.metadata().entry_count, Some(2));
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use glossa_types::DictionaryId;

use crate::dictionary::Dictionary;
use crate::groups::{Group, MuteSet};

/// Ordered set of loaded dictionary backends
#[derive(Clone, Default)]
pub struct Registry {
    dictionaries: Vec<Arc<dyn Dictionary>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dictionaries(dictionaries: impl IntoIterator<Item = Arc<dyn Dictionary>>) -> Self {
        let mut registry = Self::new();
        registry.load(dictionaries);
        registry
    }

    /// Replace the whole set. Duplicate ids keep their first occurrence.
    ///
    /// Callers holding groups must prune them against the new set.
    pub fn load(
        &mut self,
        dictionaries: impl IntoIterator<Item = Arc<dyn Dictionary>>,
    ) -> &[Arc<dyn Dictionary>] {
        let mut seen = HashSet::new();
        self.dictionaries = dictionaries
            .into_iter()
            .filter(|dictionary| {
                let fresh = seen.insert(dictionary.id().clone());
                if !fresh {
                    tracing::warn!(
                        "Skipping duplicate dictionary id {} ({})",
                        dictionary.id(),
                        dictionary.name()
                    );
                }
                fresh
            })
            .collect();

        tracing::info!("Registry holds {} dictionaries", self.dictionaries.len());
        &self.dictionaries
    }

    pub fn dictionaries(&self) -> &[Arc<dyn Dictionary>] {
        &self.dictionaries
    }

    pub fn get(&self, id: &DictionaryId) -> Option<&Arc<dyn Dictionary>> {
        self.dictionaries.iter().find(|d| d.id() == id)
    }

    pub fn contains(&self, id: &DictionaryId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &DictionaryId> {
        self.dictionaries.iter().map(|d| d.id())
    }

    pub fn len(&self) -> usize {
        self.dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.is_empty()
    }

    /// Dictionaries taking part in a search: the group's members in group
    /// order minus muted ones, or the whole registry when no group is given
    pub fn active_set_for(
        &self,
        group: Option<&Group>,
        mutes: Option<&MuteSet>,
    ) -> Vec<Arc<dyn Dictionary>> {
        let Some(group) = group else {
            return self.dictionaries.clone();
        };

        group
            .dictionaries
            .iter()
            .filter(|id| mutes.is_none_or(|muted| !muted.contains(*id)))
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glossa_types::GroupId;

    use super::*;
    use crate::tests::fakes::FakeDictionary;

    fn registry() -> Registry {
        Registry::with_dictionaries([
            FakeDictionary::new("d1", &["cat"]).shared(),
            FakeDictionary::new("d2", &["dog"]).shared(),
            FakeDictionary::new("d3", &["cow"]).shared(),
        ])
    }

    fn group(ids: &[&str]) -> Group {
        Group {
            id: GroupId(1),
            name: "g".to_string(),
            dictionaries: ids.iter().map(|id| DictionaryId::new(*id)).collect(),
            favorite: false,
        }
    }

    fn ids(set: &[Arc<dyn Dictionary>]) -> Vec<&str> {
        set.iter().map(|d| d.id().as_str()).collect()
    }

    #[test]
    fn no_group_means_whole_registry() {
        let registry = registry();
        assert_eq!(ids(&registry.active_set_for(None, None)), vec!["d1", "d2", "d3"]);
    }

    #[test]
    fn group_order_wins_over_load_order() {
        let registry = registry();
        let group = group(&["d3", "d1"]);

        assert_eq!(ids(&registry.active_set_for(Some(&group), None)), vec!["d3", "d1"]);
    }

    #[test]
    fn muted_members_are_excluded() {
        let registry = registry();
        let group = group(&["d1", "d2"]);
        let mutes = MuteSet::from([DictionaryId::new("d1")]);

        assert_eq!(ids(&registry.active_set_for(Some(&group), Some(&mutes))), vec!["d2"]);
    }

    #[test]
    fn muting_a_non_member_changes_nothing() {
        let registry = registry();
        let group = group(&["d1", "d2"]);
        let mutes = MuteSet::from([DictionaryId::new("d3")]);

        assert_eq!(
            ids(&registry.active_set_for(Some(&group), Some(&mutes))),
            ids(&registry.active_set_for(Some(&group), None)),
        );
    }

    #[test]
    fn reload_replaces_and_dedups() {
        let mut registry = registry();
        registry.load([
            FakeDictionary::new("d2", &["dog"]).shared(),
            FakeDictionary::new("d2", &["duck"]).shared(),
        ]);

        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(&"d1".into()));
    }
}

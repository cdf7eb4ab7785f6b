use std::collections::{BTreeSet, HashMap};

use glossa_config::{GroupConfig, MutedDictionaries};
use glossa_types::{DictionaryId, GroupId};

use crate::error::GroupError;
use crate::registry::Registry;

/// Dictionaries muted in one group, always a subset of its members
pub type MuteSet = BTreeSet<DictionaryId>;

/// Named, ordered subset of the registry; order is search priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub dictionaries: Vec<DictionaryId>,
    pub favorite: bool,
}

impl Group {
    pub fn contains(&self, id: &DictionaryId) -> bool {
        self.dictionaries.contains(id)
    }
}

/// User-defined groups plus the per-group mute overlay
#[derive(Debug, Clone)]
pub struct Groups {
    groups: Vec<Group>,
    mutes: HashMap<GroupId, MuteSet>,
    next_id: u32,
}

impl Default for Groups {
    fn default() -> Self {
        Self::new()
    }
}

impl Groups {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            mutes: HashMap::new(),
            next_id: 1,
        }
    }

    /// Rebuild from persisted state, dropping references the registry
    /// does not know about
    pub fn from_config(
        configs: &[GroupConfig],
        muted: &[MutedDictionaries],
        registry: &Registry,
    ) -> Self {
        let mut groups = Self::new();

        for config in configs {
            if groups.get(config.id).is_some() {
                tracing::warn!("Skipping duplicate group id {}", config.id);
                continue;
            }
            let Some(next_id) = config.id.0.checked_add(1) else {
                tracing::warn!("Skipping group '{}': id {} is out of range", config.name, config.id);
                continue;
            };
            groups.groups.push(Group {
                id: config.id,
                name: config.name.clone(),
                dictionaries: dedup(&config.dictionaries),
                favorite: config.favorite,
            });
            groups.next_id = groups.next_id.max(next_id);
        }

        for entry in muted {
            groups
                .mutes
                .entry(entry.group)
                .or_default()
                .extend(entry.dictionaries.iter().cloned());
        }

        let dropped = groups.prune(registry);
        if dropped > 0 {
            tracing::info!("Dropped {} stale dictionary references from groups", dropped);
        }

        groups
    }

    pub fn to_config(&self) -> (Vec<GroupConfig>, Vec<MutedDictionaries>) {
        let configs = self
            .groups
            .iter()
            .map(|group| GroupConfig {
                id: group.id,
                name: group.name.clone(),
                dictionaries: group.dictionaries.clone(),
                favorite: group.favorite,
            })
            .collect();

        let mut muted: Vec<MutedDictionaries> = self
            .mutes
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(group, set)| MutedDictionaries {
                group: *group,
                dictionaries: set.iter().cloned().collect(),
            })
            .collect();
        muted.sort_by_key(|entry| entry.group);

        (configs, muted)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    fn get_mut(&mut self, id: GroupId) -> Result<&mut Group, GroupError> {
        self.groups
            .iter_mut()
            .find(|group| group.id == id)
            .ok_or(GroupError::UnknownGroup(id))
    }

    pub fn create_group(
        &mut self,
        name: &str,
        dictionaries: &[DictionaryId],
        registry: &Registry,
    ) -> Result<GroupId, GroupError> {
        let name = validate_name(name)?;
        validate_members(dictionaries, registry)?;

        let id = GroupId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(GroupError::IdsExhausted)?;
        self.groups.push(Group {
            id,
            name,
            dictionaries: dedup(dictionaries),
            favorite: false,
        });

        tracing::debug!("Created {} with {} dictionaries", id, dictionaries.len());
        Ok(id)
    }

    pub fn rename_group(&mut self, id: GroupId, name: &str) -> Result<(), GroupError> {
        let name = validate_name(name)?;
        self.get_mut(id)?.name = name;
        Ok(())
    }

    /// Replace a group's members; the mute overlay shrinks to match
    pub fn set_membership(
        &mut self,
        id: GroupId,
        dictionaries: &[DictionaryId],
        registry: &Registry,
    ) -> Result<(), GroupError> {
        validate_members(dictionaries, registry)?;

        let group = self.get_mut(id)?;
        group.dictionaries = dedup(dictionaries);
        let members = group.dictionaries.clone();

        if let Some(muted) = self.mutes.get_mut(&id) {
            muted.retain(|dictionary| members.contains(dictionary));
        }
        Ok(())
    }

    /// Remove a group. Tabs still pointing at it are the session's concern.
    pub fn delete_group(&mut self, id: GroupId) -> Result<Group, GroupError> {
        let index = self
            .groups
            .iter()
            .position(|group| group.id == id)
            .ok_or(GroupError::UnknownGroup(id))?;

        self.mutes.remove(&id);
        Ok(self.groups.remove(index))
    }

    /// Mark the default group; at most one group carries the marker
    pub fn set_favorite(&mut self, id: GroupId, favorite: bool) -> Result<(), GroupError> {
        self.get_mut(id)?;
        for group in &mut self.groups {
            if group.id == id {
                group.favorite = favorite;
            } else if favorite {
                group.favorite = false;
            }
        }
        Ok(())
    }

    pub fn favorite(&self) -> Option<&Group> {
        self.groups.iter().find(|group| group.favorite)
    }

    /// Returns whether the overlay changed. Muting a non-member is a no-op.
    pub fn mute_dictionary(
        &mut self,
        group: GroupId,
        dictionary: &DictionaryId,
        muted: bool,
    ) -> Result<bool, GroupError> {
        let members = self.get(group).ok_or(GroupError::UnknownGroup(group))?;

        if !members.contains(dictionary) {
            tracing::debug!("{} is not in {}, mute ignored", dictionary, group);
            return Ok(false);
        }

        let set = self.mutes.entry(group).or_default();
        Ok(if muted {
            set.insert(dictionary.clone())
        } else {
            set.remove(dictionary)
        })
    }

    pub fn mutes(&self, group: GroupId) -> Option<&MuteSet> {
        self.mutes.get(&group)
    }

    pub fn is_muted(&self, group: GroupId, dictionary: &DictionaryId) -> bool {
        self.mutes
            .get(&group)
            .is_some_and(|set| set.contains(dictionary))
    }

    pub fn reset_mutes(&mut self, group: GroupId) {
        self.mutes.remove(&group);
    }

    pub fn reset_all_mutes(&mut self) {
        self.mutes.clear();
    }

    /// Drop references to dictionaries missing from the registry.
    /// Returns how many references went away.
    pub fn prune(&mut self, registry: &Registry) -> usize {
        let mut dropped = 0;

        for group in &mut self.groups {
            let before = group.dictionaries.len();
            group.dictionaries.retain(|id| registry.contains(id));
            dropped += before - group.dictionaries.len();
        }

        let groups = &self.groups;
        self.mutes.retain(|id, set| {
            let Some(group) = groups.iter().find(|group| group.id == *id) else {
                return false;
            };
            set.retain(|dictionary| group.contains(dictionary));
            !set.is_empty()
        });

        dropped
    }
}

fn validate_name(name: &str) -> Result<String, GroupError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GroupError::EmptyName);
    }
    Ok(name.to_string())
}

fn validate_members(dictionaries: &[DictionaryId], registry: &Registry) -> Result<(), GroupError> {
    match dictionaries.iter().find(|id| !registry.contains(id)) {
        Some(missing) => Err(GroupError::UnknownDictionary(missing.clone())),
        None => Ok(()),
    }
}

fn dedup(dictionaries: &[DictionaryId]) -> Vec<DictionaryId> {
    let mut out: Vec<DictionaryId> = Vec::with_capacity(dictionaries.len());
    for id in dictionaries {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

use glossa_types::{DictionaryId, GroupId, TabId};

/// Failure of a single backend request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Dictionary unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Terminal failure of a whole lookup, surfaced to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LookupFailure {
    #[error("No dictionary has a match")]
    NoMatch,

    #[error("Every dictionary failed to respond")]
    BackendUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    #[error("Unknown group: {0}")]
    UnknownGroup(GroupId),

    #[error("Unknown dictionary: {0}")]
    UnknownDictionary(DictionaryId),

    #[error("Group name must not be empty")]
    EmptyName,

    #[error("No group is active")]
    NoActiveGroup,

    #[error("No group ids left")]
    IdsExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabError {
    #[error("Unknown tab: {0}")]
    UnknownTab(TabId),
}

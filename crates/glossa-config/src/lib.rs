use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::history::HistoryConfig;
use self::search::SearchConfig;
use self::ui::UiConfig;

pub mod dictionary;
pub mod history;
pub mod search;
pub mod session;
pub mod ui;

pub use session::{GroupConfig, MutedDictionaries, SessionSnapshot, TabSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub history: HistoryConfig,
    pub dictionary: DictionaryConfig,
    pub ui: UiConfig,

    /// How long shutdown waits for background tasks
    pub shutdown_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        let shutdown_timeout_ms = env::var("SHUTDOWN_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2000);

        Config {
            search: SearchConfig::new(),
            history: HistoryConfig::new(),
            dictionary: DictionaryConfig::default(),
            ui: UiConfig::default(),

            shutdown_timeout_ms,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl SessionSnapshot {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glossa_types::{DictionaryId, GroupId, HistoryEntry};

    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = Config::from_json(r#"{ "history": { "max_entries": 3 } }"#).unwrap();

        assert_eq!(config.history.max_entries, 3);
        assert!(config.history.enabled);
        assert_eq!(config.search.max_results_per_dictionary, 40);
        assert!(config.ui.show_dictionary_bar);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Config::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn session_snapshot_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let snapshot = SessionSnapshot {
            groups: vec![GroupConfig {
                id: GroupId(1),
                name: "English".to_string(),
                dictionaries: vec![DictionaryId::new("wn"), DictionaryId::new("gcide")],
                favorite: true,
            }],
            muted: vec![MutedDictionaries {
                group: GroupId(1),
                dictionaries: vec![DictionaryId::new("gcide")],
            }],
            history: vec![HistoryEntry::now("cat", Some(GroupId(1)))],
            active_group: Some(GroupId(1)),
            tabs: vec![TabSnapshot {
                word: Some("cat".to_string()),
                group: Some(GroupId(1)),
            }],
            active_tab: 0,
        };

        snapshot.save(&path).unwrap();
        let restored = SessionSnapshot::load(&path).unwrap();

        assert_eq!(restored, snapshot);
    }

    #[test]
    fn missing_session_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionSnapshot::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

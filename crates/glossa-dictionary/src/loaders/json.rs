use std::fs;
use std::path::Path;

use glossa_core::dictionary::{Dictionary, DictionaryLoader, LoadError};

use crate::types::DictFile;
use crate::word_list::WordListDictionary;

/// Reads word lists stored as JSON:
///
/// ```json
/// { "id": "en", "name": "English", "exact_only": false,
///   "entries": [{ "headword": "cat", "definitions": ["a feline"], "pos": ["noun"], "audio": true }] }
/// ```
pub struct JsonLoader;

impl DictionaryLoader for JsonLoader {
    fn load_from_file(&self, path: &Path) -> Result<Box<dyn Dictionary>, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.display().to_string()));
        }

        let data = fs::read_to_string(path)?;
        let file: DictFile =
            serde_json::from_str(&data).map_err(|e| LoadError::ParseError(e.to_string()))?;

        let id = match file.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
                .ok_or_else(|| LoadError::InvalidFormat("dictionary has no id".to_string()))?,
        };
        let name = file.name.unwrap_or_else(|| id.clone());

        tracing::debug!("Parsed {} entries for {}", file.entries.len(), id);

        let dictionary = WordListDictionary::new(id.as_str(), &name, file.entries);
        Ok(Box::new(if file.exact_only {
            dictionary.exact_only()
        } else {
            dictionary
        }))
    }

    fn supported_formats(&self) -> Vec<String> {
        vec!["json".to_string()]
    }
}

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DictEntry {
    pub headword: String,          // e.g., "cat"
    pub definitions: Vec<String>,  // e.g., ["a small domesticated feline"]
    #[serde(default)]
    pub pos: Vec<String>,          // e.g., ["noun"]
    #[serde(default)]
    pub audio: bool,               // entry ships a pronunciation
}

impl DictEntry {
    pub fn new(headword: &str, definitions: &[&str]) -> Self {
        Self {
            headword: headword.to_string(),
            definitions: definitions.iter().map(|d| d.to_string()).collect(),
            pos: Vec::new(),
            audio: false,
        }
    }
}

/// On-disk word list
#[derive(Debug, Clone, Deserialize)]
pub struct DictFile {
    /// Defaults to the file stem
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Only answer exact headword matches
    #[serde(default)]
    pub exact_only: bool,
    pub entries: Vec<DictEntry>,
}

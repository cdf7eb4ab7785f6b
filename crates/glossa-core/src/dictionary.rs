use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use glossa_types::DictionaryId;

pub use crate::error::BackendError;

/// What a backend is able to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// False for exact-lookup backends, which return at most one match
    pub prefix_match: bool,
    pub fetch_article: bool,
    pub audio: bool,
}

impl Capabilities {
    pub const FULL: Capabilities = Capabilities {
        prefix_match: true,
        fetch_article: true,
        audio: false,
    };

    pub const EXACT_ONLY: Capabilities = Capabilities {
        prefix_match: false,
        fetch_article: true,
        audio: false,
    };
}

/// Dictionary backend operations
///
/// Calls are blocking; the engine runs them on the blocking pool, one request
/// per backend per query.
pub trait Dictionary: Send + Sync {
    /// Stable identity
    fn id(&self) -> &DictionaryId;

    /// Display name
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Headwords matching `text`, in backend order
    fn match_prefix(&self, text: &str, max_results: usize) -> Result<Vec<String>, BackendError>;

    /// Article for an exact headword, `BackendError::NotFound` if absent
    fn fetch_article(&self, headword: &str) -> Result<Article, BackendError>;

    /// Whether the article for `headword` carries a pronunciation
    fn has_audio(&self, _headword: &str) -> bool {
        false
    }

    fn metadata(&self) -> DictionaryMetadata {
        DictionaryMetadata {
            name: self.name().to_string(),
            entry_count: None,
        }
    }
}

/// Load dictionaries from files
pub trait DictionaryLoader {
    /// Load dictionary from file path
    fn load_from_file(&self, path: &Path) -> Result<Box<dyn Dictionary>, LoadError>;

    /// Supported file extensions
    fn supported_formats(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub headword: String,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub text: String,
    pub part_of_speech: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DictionaryMetadata {
    pub name: String,
    pub entry_count: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Run one backend call on the blocking pool, bounded by `limit`
///
/// Panics and timeouts are folded into `BackendError::Unavailable`; a timed
/// out call keeps running in the background and its answer is dropped.
pub(crate) async fn run_backend<T, F>(
    dictionary: Arc<dyn Dictionary>,
    limit: Duration,
    work: F,
) -> Result<T, BackendError>
where
    T: Send + 'static,
    F: FnOnce(&dyn Dictionary) -> Result<T, BackendError> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || work(dictionary.as_ref()));

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(BackendError::Unavailable(format!("backend task failed: {e}"))),
        Err(_) => Err(BackendError::Unavailable(format!(
            "no answer within {}ms",
            limit.as_millis()
        ))),
    }
}

//! In-memory dictionary backends for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use glossa_types::DictionaryId;

use crate::dictionary::{Article, Capabilities, Definition, Dictionary};
use crate::error::BackendError;

/// Blocks backend calls until opened
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
    }
}

pub struct FakeDictionary {
    id: DictionaryId,
    name: String,
    words: Vec<String>,
    capabilities: Capabilities,
    failure: Option<String>,
    delay: Option<Duration>,
    gate: Option<(String, Arc<Gate>)>,
    calls: Arc<AtomicUsize>,
}

impl FakeDictionary {
    pub fn new(id: &str, words: &[&str]) -> Self {
        Self {
            id: DictionaryId::new(id),
            name: id.to_uppercase(),
            words: words.iter().map(|w| w.to_string()).collect(),
            capabilities: Capabilities::FULL,
            failure: None,
            delay: None,
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every call answers `Unavailable`
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Searches for exactly `text` wait until `gate` opens
    pub fn gated_on(mut self, text: &str, gate: Arc<Gate>) -> Self {
        self.gate = Some((text.to_string(), gate));
        self
    }

    pub fn exact_only(mut self) -> Self {
        self.capabilities = Capabilities::EXACT_ONLY;
        self
    }

    pub fn with_audio(mut self) -> Self {
        self.capabilities.audio = true;
        self
    }

    /// Counts `match_prefix` calls
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn shared(self) -> Arc<dyn Dictionary> {
        Arc::new(self)
    }

    fn find(&self, headword: &str) -> Option<&String> {
        self.words.iter().find(|w| w.eq_ignore_ascii_case(headword))
    }
}

impl Dictionary for FakeDictionary {
    fn id(&self) -> &DictionaryId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn match_prefix(&self, text: &str, max_results: usize) -> Result<Vec<String>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some((gated, gate)) = &self.gate {
            if gated == text {
                gate.wait();
            }
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(reason) = &self.failure {
            return Err(BackendError::Unavailable(reason.clone()));
        }

        if !self.capabilities.prefix_match {
            return Ok(self.find(text).cloned().into_iter().collect());
        }

        let needle = text.to_lowercase();
        Ok(self
            .words
            .iter()
            .filter(|w| w.to_lowercase().contains(&needle))
            .take(max_results)
            .cloned()
            .collect())
    }

    fn fetch_article(&self, headword: &str) -> Result<Article, BackendError> {
        if let Some(reason) = &self.failure {
            return Err(BackendError::Unavailable(reason.clone()));
        }

        let word = self
            .find(headword)
            .ok_or_else(|| BackendError::NotFound(headword.to_string()))?;

        Ok(Article {
            headword: word.clone(),
            definitions: vec![Definition {
                text: format!("{} as defined by {}", word, self.name),
                part_of_speech: vec![],
            }],
        })
    }

    fn has_audio(&self, headword: &str) -> bool {
        self.find(headword).is_some()
    }
}

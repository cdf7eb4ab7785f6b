use std::sync::Arc;
use std::time::Duration;

use glossa_types::DictionaryId;

use crate::dictionary::{Article, Dictionary, run_backend};
use crate::error::{BackendError, LookupFailure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundArticle {
    pub dictionary: DictionaryId,
    pub dictionary_name: String,
    pub article: Article,
    pub has_audio: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Articles in group order
    Found(Vec<FoundArticle>),
    Failed(LookupFailure),
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

/// Fetches one word's articles from every active dictionary concurrently
#[derive(Debug, Clone)]
pub struct ArticleLookup {
    timeout: Duration,
}

impl ArticleLookup {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn lookup(&self, word: &str, active: &[Arc<dyn Dictionary>]) -> LookupOutcome {
        let handles: Vec<_> = active
            .iter()
            .filter(|dictionary| dictionary.capabilities().fetch_article)
            .map(|dictionary| {
                let dictionary = dictionary.clone();
                let word = word.to_string();
                let limit = self.timeout;

                tokio::spawn(async move {
                    let id = dictionary.id().clone();
                    let name = dictionary.name().to_string();
                    let outcome = run_backend(dictionary, limit, move |dictionary| {
                        let article = dictionary.fetch_article(&word)?;
                        let has_audio =
                            dictionary.capabilities().audio && dictionary.has_audio(&word);
                        Ok((article, has_audio))
                    })
                    .await;
                    (id, name, outcome)
                })
            })
            .collect();

        let asked = handles.len();
        let mut found = Vec::new();
        let mut unavailable = 0;

        // All requests are already running; awaiting in order keeps group order
        for handle in handles {
            let (dictionary, dictionary_name, outcome) = match handle.await {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::error!("Article task for '{}' failed: {}", word, e);
                    unavailable += 1;
                    continue;
                }
            };

            match outcome {
                Ok((article, has_audio)) => found.push(FoundArticle {
                    dictionary,
                    dictionary_name,
                    article,
                    has_audio,
                }),
                Err(BackendError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!("{} could not fetch '{}': {}", dictionary, word, e);
                    unavailable += 1;
                }
            }
        }

        if !found.is_empty() {
            return LookupOutcome::Found(found);
        }

        if asked > 0 && unavailable == asked {
            LookupOutcome::Failed(LookupFailure::BackendUnavailable)
        } else {
            LookupOutcome::Failed(LookupFailure::NoMatch)
        }
    }
}

//! Incremental multi-dictionary search.
//!
//! Every [`SearchAggregator::search`] call bumps a generation counter and fans
//! out one blocking request per active dictionary. Completions funnel into a
//! single merge task which owns the in-progress aggregate; anything tagged with
//! a generation other than the latest one is dropped on arrival. Backends are
//! never interrupted, they simply lose the race.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use glossa_config::search::SearchConfig;
use glossa_types::{BackendFailure, DictionaryId, GroupId, MatchEntry, MatchRank, MatchResult};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::dictionary::{Dictionary, run_backend};
use crate::error::{BackendError, LookupFailure};
use crate::preprocess::{DefaultPreprocessor, Preprocessor};

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub max_results_per_dictionary: usize,
    pub backend_timeout: Duration,
    pub event_capacity: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_results_per_dictionary: config.max_results_per_dictionary,
            backend_timeout: config.backend_timeout(),
            event_capacity: config.event_capacity.max(1),
        }
    }
}

/// An issued search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Preprocessed text sent to the backends
    pub text: String,
    pub group: Option<GroupId>,
    pub generation: u64,
}

impl Query {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Notifications for the latest generation
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// A backend answered; carries the whole aggregate so far
    ResultsUpdated { generation: u64, result: MatchResult },
    /// Every dispatched request has completed
    SearchFinished { generation: u64 },
    /// The finished aggregate is empty; sent right before `SearchFinished`
    LookupFailed { generation: u64, reason: LookupFailure },
}

impl SearchEvent {
    pub fn generation(&self) -> u64 {
        match self {
            SearchEvent::ResultsUpdated { generation, .. }
            | SearchEvent::SearchFinished { generation }
            | SearchEvent::LookupFailed { generation, .. } => *generation,
        }
    }
}

enum MergeMessage {
    Begin {
        generation: u64,
        query: String,
        order: Vec<DictionaryId>,
    },
    Completed {
        generation: u64,
        dictionary: DictionaryId,
        outcome: Result<Vec<String>, BackendError>,
    },
}

/// Handle for issuing searches; results arrive on the receiver returned by
/// [`SearchAggregator::spawn`]
pub struct SearchAggregator {
    settings: SearchSettings,
    latest: Arc<AtomicU64>,
    merge_tx: AsyncSender<MergeMessage>,
    runtime: Handle,
    cancel_token: CancellationToken,
}

impl SearchAggregator {
    /// Start the merge task on the current runtime
    pub fn spawn(settings: SearchSettings) -> (Self, AsyncReceiver<SearchEvent>) {
        let (merge_tx, merge_rx) = kanal::unbounded_async();
        let (event_tx, event_rx) = kanal::bounded_async(settings.event_capacity);
        let latest = Arc::new(AtomicU64::new(0));
        let cancel_token = CancellationToken::new();

        let merger = Merger {
            latest: latest.clone(),
            events: event_tx,
            max_results: settings.max_results_per_dictionary,
            in_flight: None,
        };
        tokio::spawn(merger.run(merge_rx, cancel_token.child_token()));

        let aggregator = Self {
            settings,
            latest,
            merge_tx,
            runtime: Handle::current(),
            cancel_token,
        };
        (aggregator, event_rx)
    }

    pub fn current_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Issue a new search, superseding any in-flight one. Never blocks.
    ///
    /// Empty or whitespace-only text yields an empty result without touching
    /// any backend.
    pub fn search(
        &self,
        text: &str,
        group: Option<GroupId>,
        active: &[Arc<dyn Dictionary>],
    ) -> Query {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let query = Query {
            text: DefaultPreprocessor.process(text),
            group,
            generation,
        };

        let mut seen = HashSet::new();
        let targets: Vec<Arc<dyn Dictionary>> = if query.is_empty() {
            Vec::new()
        } else {
            active
                .iter()
                .filter(|dictionary| seen.insert(dictionary.id().clone()))
                .cloned()
                .collect()
        };

        tracing::debug!(
            "Search #{} '{}' across {} dictionaries",
            generation,
            query.text,
            targets.len()
        );

        let begin = MergeMessage::Begin {
            generation,
            query: query.text.clone(),
            order: targets.iter().map(|d| d.id().clone()).collect(),
        };
        // Begin must be queued before any completion of this generation
        if self.merge_tx.as_sync().send(begin).is_err() {
            tracing::error!("Search merge task is gone, dropping search #{}", generation);
            return query;
        }

        for dictionary in targets {
            self.dispatch(generation, &query.text, dictionary);
        }

        query
    }

    /// Invalidate the in-flight search without issuing a new one
    pub fn cancel(&self) {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Search cancelled, generation now {}", generation);
    }

    /// Stop the merge task; outstanding backend calls finish unobserved
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    fn dispatch(&self, generation: u64, text: &str, dictionary: Arc<dyn Dictionary>) {
        let merge_tx = self.merge_tx.clone();
        let limit = self.settings.backend_timeout;
        let max_results = self.settings.max_results_per_dictionary;
        let text = text.to_string();

        self.runtime.spawn(async move {
            let id = dictionary.id().clone();
            let outcome = run_backend(dictionary, limit, move |dictionary| {
                dictionary.match_prefix(&text, max_results)
            })
            .await;

            let message = MergeMessage::Completed {
                generation,
                dictionary: id,
                outcome,
            };
            if merge_tx.send(message).await.is_err() {
                tracing::debug!("Search #{} completed after merge task stopped", generation);
            }
        });
    }
}

impl Drop for SearchAggregator {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

struct InFlight {
    generation: u64,
    query: String,
    order: Vec<DictionaryId>,
    partials: HashMap<DictionaryId, Vec<MatchEntry>>,
    failures: HashMap<DictionaryId, String>,
}

impl InFlight {
    fn pending(&self) -> usize {
        self.order.len() - self.partials.len() - self.failures.len()
    }

    fn answered(&self, dictionary: &DictionaryId) -> bool {
        self.partials.contains_key(dictionary) || self.failures.contains_key(dictionary)
    }

    /// Aggregate in group order, independent of completion order
    fn snapshot(&self) -> MatchResult {
        let mut result = MatchResult::default();

        for id in &self.order {
            if let Some(entries) = self.partials.get(id) {
                result.entries.extend(entries.iter().cloned());
            }
            if let Some(reason) = self.failures.get(id) {
                result.failures.push(BackendFailure {
                    dictionary: id.clone(),
                    reason: reason.clone(),
                });
            }
        }

        result
    }

    fn failure_reason(&self) -> LookupFailure {
        if !self.order.is_empty() && self.failures.len() == self.order.len() {
            LookupFailure::BackendUnavailable
        } else {
            LookupFailure::NoMatch
        }
    }
}

/// Single owner of the in-progress aggregate
struct Merger {
    latest: Arc<AtomicU64>,
    events: AsyncSender<SearchEvent>,
    max_results: usize,
    in_flight: Option<InFlight>,
}

impl Merger {
    async fn run(mut self, merge_rx: AsyncReceiver<MergeMessage>, cancel: CancellationToken) {
        loop {
            let message = tokio::select! {
                _ = cancel.cancelled() => break,
                message = merge_rx.recv() => match message {
                    Ok(message) => message,
                    Err(_) => break,
                },
            };

            if self.handle(message).await.is_err() {
                tracing::debug!("Search event receiver dropped, stopping merge task");
                break;
            }
        }

        tracing::debug!("Search merge task stopped");
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.latest.load(Ordering::SeqCst)
    }

    async fn handle(&mut self, message: MergeMessage) -> Result<(), kanal::SendError> {
        match message {
            MergeMessage::Begin {
                generation,
                query,
                order,
            } => {
                if self.is_stale(generation) {
                    tracing::debug!("Search #{} superseded before it started", generation);
                    return Ok(());
                }
                self.in_flight = None;

                let in_flight = InFlight {
                    generation,
                    query,
                    order,
                    partials: HashMap::new(),
                    failures: HashMap::new(),
                };

                if in_flight.query.is_empty() {
                    self.emit(SearchEvent::ResultsUpdated {
                        generation,
                        result: MatchResult::default(),
                    })
                    .await?;
                    return self.emit(SearchEvent::SearchFinished { generation }).await;
                }

                if in_flight.order.is_empty() {
                    return self.finish(in_flight).await;
                }

                self.in_flight = Some(in_flight);
                Ok(())
            }
            MergeMessage::Completed {
                generation,
                dictionary,
                outcome,
            } => {
                if self.is_stale(generation) {
                    tracing::debug!("Dropping stale answer from {} for #{}", dictionary, generation);
                    return Ok(());
                }
                let Some(in_flight) = self.in_flight.as_mut() else {
                    return Ok(());
                };
                if in_flight.generation != generation {
                    return Ok(());
                }

                let first_answer = !in_flight.answered(&dictionary);
                in_flight.failures.remove(&dictionary);
                match outcome {
                    Ok(headwords) => {
                        let entries = rank(&in_flight.query, &dictionary, headwords, self.max_results);
                        tracing::debug!("{} matched {} for #{}", dictionary, entries.len(), generation);
                        in_flight.partials.insert(dictionary, entries);
                    }
                    Err(e) => {
                        tracing::warn!("{} failed for #{}: {}", dictionary, generation, e);
                        in_flight.partials.remove(&dictionary);
                        in_flight.failures.insert(dictionary, e.to_string());
                    }
                }

                let result = in_flight.snapshot();
                let done = first_answer && in_flight.pending() == 0;

                self.emit(SearchEvent::ResultsUpdated { generation, result })
                    .await?;

                if done {
                    if let Some(in_flight) = self.in_flight.take() {
                        return self.finish(in_flight).await;
                    }
                }
                Ok(())
            }
        }
    }

    async fn finish(&mut self, in_flight: InFlight) -> Result<(), kanal::SendError> {
        let generation = in_flight.generation;
        let result = in_flight.snapshot();

        if result.is_empty() {
            let reason = in_flight.failure_reason();
            tracing::debug!("Search #{} found nothing: {}", generation, reason);
            self.emit(SearchEvent::LookupFailed { generation, reason })
                .await?;
        }

        tracing::debug!("Search #{} finished with {} matches", generation, result.len());
        self.emit(SearchEvent::SearchFinished { generation }).await
    }

    async fn emit(&self, event: SearchEvent) -> Result<(), kanal::SendError> {
        if self.is_stale(event.generation()) {
            return Ok(());
        }
        self.events.send(event).await
    }
}

/// Order one backend's answer: closeness to the query first, backend order
/// second (stable sort), capped at `max_results`
fn rank(
    query: &str,
    dictionary: &DictionaryId,
    headwords: Vec<String>,
    max_results: usize,
) -> Vec<MatchEntry> {
    let mut entries: Vec<MatchEntry> = headwords
        .into_iter()
        .map(|headword| MatchEntry {
            dictionary: dictionary.clone(),
            rank: MatchRank::classify(query, &headword),
            headword,
        })
        .collect();

    entries.sort_by_key(|entry| entry.rank);
    entries.truncate(max_results);
    entries
}

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_max_results_per_dictionary() -> usize {
    40
}

fn default_backend_timeout_ms() -> u64 {
    5000
}

fn default_event_capacity() -> usize {
    256
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Matches kept from a single backend per query
    #[serde(default = "default_max_results_per_dictionary")]
    pub max_results_per_dictionary: usize,
    /// A backend slower than this is reported unavailable for the query
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,
    /// Capacity of the aggregator's notification channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results_per_dictionary: default_max_results_per_dictionary(),
            backend_timeout_ms: default_backend_timeout_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        let max_results_per_dictionary = env::var("GLOSSA_MAX_RESULTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_results_per_dictionary);

        let backend_timeout_ms = env::var("GLOSSA_BACKEND_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_backend_timeout_ms);

        Self {
            max_results_per_dictionary,
            backend_timeout_ms,
            event_capacity: default_event_capacity(),
        }
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}

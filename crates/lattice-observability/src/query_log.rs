//! Recent query log: normalized query, k, result count, cache provenance,
//! graph availability, latency.

use std::collections::VecDeque;
use std::time::Duration;

use lattice_core::AvailabilityState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub query_id: String,
    pub query: String,
    pub k: usize,
    pub result_count: usize,
    pub graph_augmented: usize,
    pub cache_hit: bool,
    pub availability: AvailabilityState,
    pub latency: Duration,
    pub timestamp_epoch_ms: i64,
}

/// Ring buffer of recent queries.
#[derive(Debug, Clone)]
pub struct QueryLog {
    entries: VecDeque<QueryLogEntry>,
    max_entries: usize,
}

impl QueryLog {
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        tracing::debug!(
            event = "query_logged",
            query_id = %entry.query_id,
            k = entry.k,
            result_count = entry.result_count,
            cache_hit = entry.cache_hit,
            availability = %entry.availability,
            latency_ms = entry.latency.as_millis() as u64,
            "query logged"
        );
        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent first.
    pub fn recent(&self, n: usize) -> Vec<QueryLogEntry> {
        self.entries.iter().rev().take(n).cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::with_capacity(lattice_core::config::defaults::DEFAULT_QUERY_LOG_CAPACITY)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::availability::AvailabilityState;
use super::evidence::{Provenance, ScoredEvidence};

/// Ranked evidence for one query. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<ScoredEvidence>,
    /// Graph availability the result was computed under.
    pub availability: AvailabilityState,
    pub generated_at: DateTime<Utc>,
}

impl SearchResult {
    pub fn empty(availability: AvailabilityState) -> Self {
        Self {
            items: Vec::new(),
            availability,
            generated_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|e| e.item.id.as_str()).collect()
    }

    pub fn graph_augmented_count(&self) -> usize {
        self.items
            .iter()
            .filter(|e| e.provenance == Provenance::GraphAugmented)
            .count()
    }

    pub fn is_vector_only(&self) -> bool {
        self.graph_augmented_count() == 0
    }
}

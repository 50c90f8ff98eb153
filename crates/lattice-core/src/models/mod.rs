mod availability;
mod cache_stats;
mod degradation_event;
mod document;
mod embedding;
mod evidence;
mod graph;
mod search_result;

pub use availability::{AvailabilityState, ProbeOutcome};
pub use cache_stats::{CacheKind, CacheStats};
pub use degradation_event::DegradationEvent;
pub use document::{Chunk, Document, MetadataValue};
pub use embedding::{Embedding, VectorHit};
pub use evidence::{EvidenceItem, EvidenceKind, Provenance, ScoredEvidence};
pub use graph::{Entity, GraphNode, GraphPattern, NodeKind, Relationship, Subgraph};
pub use search_result::SearchResult;

//! Retrieval metrics and latency windows.

mod latency;
mod retrieval_metrics;

pub use latency::LatencyWindow;
pub use retrieval_metrics::{QueryOutcomeKind, RetrievalMetrics, RetrievalMetricsSnapshot};

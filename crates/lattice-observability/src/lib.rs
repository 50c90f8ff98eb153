//! # lattice-observability
//!
//! Structured tracing setup and named log events, retrieval metrics with
//! latency percentiles, a bounded query log, component health roll-up, and
//! degradation event tracking with alerting.

pub mod degradation;
pub mod health;
pub mod metrics;
pub mod query_log;
pub mod tracing_setup;

pub use degradation::{evaluate_alerts, AlertLevel, DegradationAlert, DegradationTracker};
pub use health::{ComponentHealth, HealthStatus};
pub use metrics::{LatencyWindow, RetrievalMetrics};
pub use query_log::{QueryLog, QueryLogEntry};

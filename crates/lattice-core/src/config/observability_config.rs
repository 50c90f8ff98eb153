use serde::{Deserialize, Serialize};

use super::defaults;

/// Observability subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive used when `LATTICE_LOG` is unset.
    pub log_filter: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
    /// Recent queries retained for inspection.
    pub query_log_capacity: usize,
    /// Latency samples retained for percentile queries.
    pub latency_window: usize,
    /// Window for degradation alert evaluation.
    pub alert_window_secs: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: defaults::DEFAULT_LOG_FILTER.to_string(),
            json_logs: defaults::DEFAULT_JSON_LOGS,
            query_log_capacity: defaults::DEFAULT_QUERY_LOG_CAPACITY,
            latency_window: defaults::DEFAULT_LATENCY_WINDOW,
            alert_window_secs: defaults::DEFAULT_ALERT_WINDOW_SECS,
        }
    }
}

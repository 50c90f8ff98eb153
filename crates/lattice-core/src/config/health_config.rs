use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Health monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub probe_interval_ms: u64,
    pub probe_timeout_ms: u64,
    /// Consecutive successful probes needed to reach HEALTHY.
    pub success_threshold: u32,
    /// Consecutive failed probes needed to reach UNREACHABLE.
    pub failure_threshold: u32,
    /// Operator override: report UNREACHABLE regardless of probes.
    pub force_vector_only: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_interval_ms: defaults::DEFAULT_PROBE_INTERVAL_MS,
            probe_timeout_ms: defaults::DEFAULT_PROBE_TIMEOUT_MS,
            success_threshold: defaults::DEFAULT_SUCCESS_THRESHOLD,
            failure_threshold: defaults::DEFAULT_FAILURE_THRESHOLD,
            force_vector_only: defaults::DEFAULT_FORCE_VECTOR_ONLY,
        }
    }
}

impl HealthConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

//! Pure transition rules. `N` consecutive successes reach HEALTHY, `M`
//! consecutive failures reach UNREACHABLE, and the first failure out of
//! HEALTHY lands in DEGRADED.

use lattice_core::config::HealthConfig;
use lattice_core::AvailabilityState;

use crate::cell::AvailabilitySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// `N`.
    pub success: u32,
    /// `M`.
    pub failure: u32,
}

impl Thresholds {
    pub fn from_config(config: &HealthConfig) -> Self {
        Self {
            success: config.success_threshold.max(1),
            failure: config.failure_threshold.max(1),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&HealthConfig::default())
    }
}

/// Apply one probe outcome.
pub fn apply(
    current: AvailabilitySnapshot,
    success: bool,
    thresholds: Thresholds,
) -> AvailabilitySnapshot {
    if success {
        let successes = current.successes.saturating_add(1);
        let state = if successes >= thresholds.success {
            AvailabilityState::Healthy
        } else if current.state == AvailabilityState::Unreachable {
            AvailabilityState::Degraded
        } else {
            current.state
        };
        AvailabilitySnapshot {
            state,
            successes,
            failures: 0,
        }
    } else {
        let failures = current.failures.saturating_add(1);
        let state = if failures >= thresholds.failure {
            AvailabilityState::Unreachable
        } else if current.state == AvailabilityState::Healthy {
            AvailabilityState::Degraded
        } else {
            current.state
        };
        AvailabilitySnapshot {
            state,
            successes: 0,
            failures,
        }
    }
}

//! The health monitor: sole writer of the graph availability state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::Instrument;

use lattice_core::config::HealthConfig;
use lattice_core::models::{DegradationEvent, ProbeOutcome};
use lattice_core::traits::IGraphStore;
use lattice_core::AvailabilityState;
use lattice_observability::tracing_setup::events;
use lattice_observability::{evaluate_alerts, DegradationAlert, DegradationTracker};

use crate::cell::{AvailabilityCell, AvailabilitySnapshot};
use crate::transition::{self, Thresholds};

/// Component name used in degradation tracking.
pub const GRAPH_COMPONENT: &str = "graph_store";
/// Component name for the operator override.
pub const OVERRIDE_COMPONENT: &str = "vector_only_override";

/// Availability as reported to operators.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    /// What the orchestrator acts on.
    pub state: AvailabilityState,
    /// What the probes alone say.
    pub probed_state: AvailabilityState,
    pub forced_vector_only: bool,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    pub probes_total: u64,
    pub last_probe: Option<ProbeOutcome>,
}

/// Tracks graph store availability from probe outcomes.
///
/// Reads are a single atomic load. Only [`record_probe`](Self::record_probe)
/// moves the probe-derived state; query-path failures may ask for an early
/// probe via [`request_probe`](Self::request_probe) but never flip the state
/// themselves.
#[derive(Debug)]
pub struct HealthMonitor {
    cell: AvailabilityCell,
    forced: AtomicBool,
    thresholds: Thresholds,
    probe_interval: Duration,
    probe_timeout: Duration,
    probes_total: AtomicU64,
    last_probe: Mutex<Option<ProbeOutcome>>,
    tracker: Mutex<DegradationTracker>,
    wake: Notify,
}

impl HealthMonitor {
    pub fn new(config: &HealthConfig) -> Self {
        let monitor = Self {
            cell: AvailabilityCell::new(AvailabilityState::Healthy),
            forced: AtomicBool::new(false),
            thresholds: Thresholds::from_config(config),
            probe_interval: config.probe_interval(),
            probe_timeout: config.probe_timeout(),
            probes_total: AtomicU64::new(0),
            last_probe: Mutex::new(None),
            tracker: Mutex::new(DegradationTracker::new()),
            wake: Notify::new(),
        };
        if config.force_vector_only {
            monitor.set_forced_vector_only(true);
        }
        monitor
    }

    /// The state the orchestrator should act on. The operator override wins
    /// over anything the probes say.
    pub fn state(&self) -> AvailabilityState {
        if self.is_forced_vector_only() {
            AvailabilityState::Unreachable
        } else {
            self.cell.load().state
        }
    }

    pub fn probed_state(&self) -> AvailabilityState {
        self.cell.load().state
    }

    pub fn snapshot(&self) -> AvailabilitySnapshot {
        self.cell.load()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn probe_interval(&self) -> Duration {
        self.probe_interval
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn is_forced_vector_only(&self) -> bool {
        self.forced.load(Ordering::Acquire)
    }

    /// Toggle operator-forced vector-only mode. Returns the previous value.
    pub fn set_forced_vector_only(&self, forced: bool) -> bool {
        let previous = self.forced.swap(forced, Ordering::AcqRel);
        if previous == forced {
            return previous;
        }
        events::vector_only_forced(forced);
        let mut tracker = self.tracker.lock().unwrap_or_else(|e| e.into_inner());
        if forced {
            tracker.record(DegradationEvent::now(
                OVERRIDE_COMPONENT,
                "operator forced vector-only mode",
                "vector_only",
            ));
        } else {
            tracker.mark_recovered(OVERRIDE_COMPONENT);
        }
        previous
    }

    /// Ask the probe loop to run a probe now instead of waiting for the next
    /// tick. Calls made while a request is pending collapse into one.
    pub fn request_probe(&self) {
        self.wake.notify_one();
    }

    pub(crate) async fn probe_requested(&self) {
        self.wake.notified().await;
    }

    /// Feed one probe outcome through the transition rules. Returns the
    /// probe-derived state afterwards.
    pub fn record_probe(&self, outcome: ProbeOutcome) -> AvailabilityState {
        let success = outcome.success;
        let thresholds = self.thresholds;
        let (before, after) = self
            .cell
            .update(|snap| transition::apply(snap, success, thresholds));
        self.probes_total.fetch_add(1, Ordering::Relaxed);

        if before.state != after.state {
            let reason = outcome
                .error
                .clone()
                .unwrap_or_else(|| format!("{} consecutive successful probes", after.successes));
            events::availability_changed(before.state, after.state, &reason);
            self.track_transition(before.state, after.state, &reason);
        }

        *self.last_probe.lock().unwrap_or_else(|e| e.into_inner()) = Some(outcome);
        after.state
    }

    fn track_transition(&self, from: AvailabilityState, to: AvailabilityState, reason: &str) {
        let mut tracker = self.tracker.lock().unwrap_or_else(|e| e.into_inner());
        match to {
            AvailabilityState::Healthy => {
                tracker.mark_recovered(GRAPH_COMPONENT);
            }
            AvailabilityState::Degraded if from == AvailabilityState::Healthy => {
                tracker.record(DegradationEvent::now(GRAPH_COMPONENT, reason, "best_effort_graph"));
            }
            AvailabilityState::Unreachable => {
                tracker.record(DegradationEvent::now(GRAPH_COMPONENT, reason, "vector_only"));
            }
            AvailabilityState::Degraded => {}
        }
    }

    /// Ping the store once under the probe timeout and record the outcome.
    pub async fn probe_once(&self, store: &dyn IGraphStore) -> ProbeOutcome {
        let span = lattice_observability::probe_span!(store.name());
        let started = Instant::now();
        let result = tokio::time::timeout(self.probe_timeout, store.ping())
            .instrument(span)
            .await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(Ok(())) => ProbeOutcome::success(latency_ms),
            Ok(Err(e)) => ProbeOutcome::failure(latency_ms, e.to_string()),
            Err(_) => ProbeOutcome::failure(
                latency_ms,
                format!("probe timed out after {}ms", self.probe_timeout.as_millis()),
            ),
        };
        tracing::debug!(
            store = store.name(),
            success = outcome.success,
            latency_ms,
            "graph probe finished"
        );
        self.record_probe(outcome.clone());
        outcome
    }

    pub fn last_probe(&self) -> Option<ProbeOutcome> {
        self.last_probe
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn report(&self) -> AvailabilityReport {
        let snap = self.cell.load();
        let forced = self.is_forced_vector_only();
        AvailabilityReport {
            state: if forced { AvailabilityState::Unreachable } else { snap.state },
            probed_state: snap.state,
            forced_vector_only: forced,
            consecutive_successes: snap.successes,
            consecutive_failures: snap.failures,
            probes_total: self.probes_total.load(Ordering::Relaxed),
            last_probe: self.last_probe(),
        }
    }

    /// Degradation alerts over the last `window_secs`.
    pub fn alerts(&self, window_secs: i64) -> Vec<DegradationAlert> {
        let tracker = self.tracker.lock().unwrap_or_else(|e| e.into_inner());
        evaluate_alerts(&tracker, window_secs)
    }

    /// Whether a degradation of `component` is currently open.
    pub fn is_degradation_active(&self, component: &str) -> bool {
        self.tracker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_active(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(n: u32, m: u32) -> HealthMonitor {
        HealthMonitor::new(&HealthConfig {
            success_threshold: n,
            failure_threshold: m,
            ..HealthConfig::default()
        })
    }

    fn fail(monitor: &HealthMonitor, times: usize) {
        for _ in 0..times {
            monitor.record_probe(ProbeOutcome::failure(1, "connection refused"));
        }
    }

    fn succeed(monitor: &HealthMonitor, times: usize) {
        for _ in 0..times {
            monitor.record_probe(ProbeOutcome::success(1));
        }
    }

    #[test]
    fn starts_healthy() {
        let m = monitor(3, 3);
        assert_eq!(m.state(), AvailabilityState::Healthy);
        assert!(m.last_probe().is_none());
    }

    #[test]
    fn m_failures_reach_unreachable_and_n_successes_recover() {
        let m = monitor(3, 3);
        fail(&m, 1);
        assert_eq!(m.state(), AvailabilityState::Degraded);
        fail(&m, 2);
        assert_eq!(m.state(), AvailabilityState::Unreachable);
        assert!(m.is_degradation_active(GRAPH_COMPONENT));

        succeed(&m, 1);
        assert_eq!(m.state(), AvailabilityState::Degraded);
        succeed(&m, 2);
        assert_eq!(m.state(), AvailabilityState::Healthy);
        assert!(!m.is_degradation_active(GRAPH_COMPONENT));
    }

    #[test]
    fn forced_override_wins_over_probes() {
        let m = monitor(1, 1);
        assert!(!m.set_forced_vector_only(true));
        succeed(&m, 5);
        assert_eq!(m.state(), AvailabilityState::Unreachable);
        assert_eq!(m.probed_state(), AvailabilityState::Healthy);

        let report = m.report();
        assert!(report.forced_vector_only);
        assert_eq!(report.state, AvailabilityState::Unreachable);
        assert_eq!(report.probed_state, AvailabilityState::Healthy);

        m.set_forced_vector_only(false);
        assert_eq!(m.state(), AvailabilityState::Healthy);
        assert!(!m.is_degradation_active(OVERRIDE_COMPONENT));
    }

    #[test]
    fn forced_from_config() {
        let m = HealthMonitor::new(&HealthConfig {
            force_vector_only: true,
            ..HealthConfig::default()
        });
        assert_eq!(m.state(), AvailabilityState::Unreachable);
        assert!(m.is_degradation_active(OVERRIDE_COMPONENT));
    }

    #[test]
    fn report_tracks_last_probe_and_counters() {
        let m = monitor(3, 3);
        fail(&m, 2);
        let report = m.report();
        assert_eq!(report.consecutive_failures, 2);
        assert_eq!(report.probes_total, 2);
        let last = report.last_probe.unwrap();
        assert!(!last.success);
        assert_eq!(last.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn repeated_outages_raise_an_alert() {
        let m = monitor(1, 1);
        for _ in 0..4 {
            fail(&m, 1);
            succeed(&m, 1);
        }
        let alerts = m.alerts(3600);
        assert!(alerts.iter().any(|a| a.component == GRAPH_COMPONENT));
    }
}

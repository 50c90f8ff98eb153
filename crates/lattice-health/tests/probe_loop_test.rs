//! Probe loop against an in-memory store, on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lattice_core::config::HealthConfig;
use lattice_core::AvailabilityState;
use lattice_graph::InMemoryGraphStore;
use lattice_health::{spawn_probe_loop, HealthMonitor};

fn config() -> HealthConfig {
    HealthConfig {
        probe_interval_ms: 1_000,
        probe_timeout_ms: 200,
        success_threshold: 3,
        failure_threshold: 3,
        force_vector_only: false,
    }
}

#[tokio::test(start_paused = true)]
async fn outage_and_recovery_follow_probe_results() {
    let store = Arc::new(InMemoryGraphStore::new());
    let monitor = Arc::new(HealthMonitor::new(&config()));
    let cancel = CancellationToken::new();
    let handle = spawn_probe_loop(Arc::clone(&monitor), store.clone(), cancel.clone());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(monitor.state(), AvailabilityState::Healthy);

    store.set_offline(true);
    // Probes at 1s, 2s, 3s fail.
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(monitor.state(), AvailabilityState::Degraded);
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    assert_eq!(monitor.state(), AvailabilityState::Unreachable);

    store.set_offline(false);
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(monitor.state(), AvailabilityState::Degraded);
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    assert_eq!(monitor.state(), AvailabilityState::Healthy);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_store_counts_as_failure() {
    let store = Arc::new(InMemoryGraphStore::new());
    store.set_latency(Duration::from_secs(5));
    let monitor = HealthMonitor::new(&config());

    let outcome = monitor.probe_once(store.as_ref()).await;
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("timed out"));
    assert_eq!(monitor.state(), AvailabilityState::Degraded);
}

#[tokio::test(start_paused = true)]
async fn requested_probe_runs_before_the_next_tick() {
    let store = Arc::new(InMemoryGraphStore::new());
    let monitor = Arc::new(HealthMonitor::new(&HealthConfig {
        probe_interval_ms: 60_000,
        ..config()
    }));
    let cancel = CancellationToken::new();
    let handle = spawn_probe_loop(Arc::clone(&monitor), store.clone(), cancel.clone());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(monitor.report().probes_total, 1);

    store.set_offline(true);
    monitor.request_probe();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(monitor.report().probes_total, 2);
    assert_eq!(monitor.state(), AvailabilityState::Degraded);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_loop() {
    let store = Arc::new(InMemoryGraphStore::new());
    let monitor = Arc::new(HealthMonitor::new(&config()));
    let cancel = CancellationToken::new();
    let handle = spawn_probe_loop(Arc::clone(&monitor), store, cancel.clone());

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    cancel.cancel();
    handle.await.unwrap();

    let probes = monitor.report().probes_total;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(monitor.report().probes_total, probes);
}

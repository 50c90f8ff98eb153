//! Background probe task.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use lattice_core::traits::IGraphStore;

use crate::HealthMonitor;

/// Probe `store` every `probe_interval`, or sooner when
/// [`HealthMonitor::request_probe`] is called, until `cancel` fires.
/// The first probe runs immediately.
pub fn spawn_probe_loop(
    monitor: Arc<HealthMonitor>,
    store: Arc<dyn IGraphStore>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(monitor.probe_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            store = store.name(),
            interval_ms = monitor.probe_interval().as_millis() as u64,
            "health probe loop started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                _ = monitor.probe_requested() => {
                    ticker.reset();
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = monitor.probe_once(store.as_ref()) => {}
            }
        }

        tracing::info!(store = store.name(), "health probe loop stopped");
    })
}

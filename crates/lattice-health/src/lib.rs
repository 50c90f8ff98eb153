//! # lattice-health
//!
//! Owns the graph store's [`AvailabilityState`]. A background probe loop
//! pings the store on a fixed interval and feeds each outcome through the
//! transition rules in [`transition`]; the orchestrator only ever reads the
//! published state, so query latency never depends on probe latency.
//!
//! [`AvailabilityState`]: lattice_core::AvailabilityState

pub mod cell;
pub mod monitor;
pub mod probe_loop;
pub mod transition;

pub use cell::{AvailabilityCell, AvailabilitySnapshot};
pub use monitor::{AvailabilityReport, HealthMonitor};
pub use probe_loop::spawn_probe_loop;
pub use transition::Thresholds;

//! Tracing initialization and configuration.

pub mod events;
pub mod spans;

use std::sync::Once;

use lattice_core::config::ObservabilityConfig;
use lattice_core::constants::LOG_ENV_VAR;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Lattice tracing/logging system.
///
/// Reads `LATTICE_LOG` for per-crate levels, e.g.
/// `LATTICE_LOG=lattice_graph=debug,lattice_cache=warn`, falling back to
/// `config.log_filter` when unset or invalid.
///
/// Idempotent; only the first call installs a subscriber.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.json_logs {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_current_span(true),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
        // Another subscriber may already be installed by the host process.
        if let Err(e) = result {
            tracing::debug!(error = %e, "tracing subscriber already set");
        }
    });
}

//! # lattice-core
//!
//! Foundation crate for the Lattice hybrid retrieval engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::LatticeConfig;
pub use errors::{LatticeError, LatticeResult};
pub use models::{AvailabilityState, CacheKind, Provenance, SearchResult};

//! # lattice-retrieval
//!
//! The query path. [`RetrievalEngine`] turns a query string into a ranked
//! [`SearchResult`]:
//!
//! 1. normalize the query and fetch (or compute and cache) its embedding;
//! 2. serve from the search-result cache when possible;
//! 3. otherwise over-fetch vector candidates, expand the strongest ones one
//!    hop through the graph when availability allows, merge, rank, truncate;
//! 4. cache and return.
//!
//! Graph and cache trouble never fails a query; it shows up as fewer
//! graph-augmented items, cache misses, and in [`OpsSurface`] reports.
//!
//! [`LatticeRuntime`] wires everything from a [`LatticeConfig`].
//!
//! [`SearchResult`]: lattice_core::SearchResult
//! [`LatticeConfig`]: lattice_core::LatticeConfig

pub mod embedder;
pub mod engine;
pub mod expansion;
pub mod merge;
pub mod normalize;
pub mod ops;
pub mod runtime;

pub use embedder::HashingEmbedder;
pub use engine::{CacheProvenance, EngineComponents, RetrievalEngine, RetrievalOutcome};
pub use normalize::normalize_query;
pub use ops::{HealthStatusReport, OpsSurface};
pub use runtime::LatticeRuntime;

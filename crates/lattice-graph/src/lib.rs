//! # lattice-graph
//!
//! Adapters for the graph side of hybrid retrieval.
//!
//! - [`InMemoryGraphStore`]: petgraph-backed store for single-node
//!   deployments and tests.
//! - [`Neo4jGraphStore`]: remote store over Bolt.
//! - [`ResilientGraphStore`]: wraps any store with a bounded connection
//!   pool, per-attempt timeouts and retries with capped exponential backoff.
//!
//! Every adapter reports backend trouble as a [`GraphError`]; an empty
//! [`Subgraph`] only ever means "nothing matched".
//!
//! [`GraphError`]: lattice_core::errors::GraphError
//! [`Subgraph`]: lattice_core::models::Subgraph

pub mod factory;
pub mod memory;
pub mod neo4j;
pub mod resilient;
pub mod traversal;

pub use factory::create_graph_store;
pub use memory::InMemoryGraphStore;
pub use neo4j::Neo4jGraphStore;
pub use resilient::{ResilienceStats, ResilientGraphStore, RetryPolicy};

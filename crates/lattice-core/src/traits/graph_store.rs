use async_trait::async_trait;

use crate::errors::GraphError;
use crate::models::{GraphNode, GraphPattern, Relationship, Subgraph};

/// Graph database adapter.
///
/// An `Ok` with an empty subgraph means the pattern matched nothing.
/// Backend trouble is always an `Err`.
#[async_trait]
pub trait IGraphStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upsert_node(&self, node: &GraphNode) -> Result<(), GraphError>;

    /// Both endpoints must already exist.
    async fn upsert_relationship(&self, rel: &Relationship) -> Result<(), GraphError>;

    /// Everything reachable from the pattern's start nodes within `depth` hops.
    async fn query(&self, pattern: &GraphPattern, depth: usize) -> Result<Subgraph, GraphError>;

    /// Cheap liveness check used by health probes.
    async fn ping(&self) -> Result<(), GraphError>;
}

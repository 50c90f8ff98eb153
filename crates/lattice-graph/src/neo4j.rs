//! Neo4j adapter over Bolt.
//!
//! Every node the engine writes carries the [`GRAPH_NODE_LABEL`] label and a
//! unique `id` property; node properties travel as one JSON string.
//! Relationship types cannot be bound as query parameters, so they are
//! sanitized and interpolated.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph};
use tokio::sync::Mutex;

use lattice_core::config::GraphConfig;
use lattice_core::constants::GRAPH_NODE_LABEL;
use lattice_core::errors::GraphError;
use lattice_core::models::{GraphNode, GraphPattern, NodeKind, Relationship, Subgraph};
use lattice_core::traits::IGraphStore;

use crate::traversal::validate_pattern;

fn unavailable(e: impl std::fmt::Display) -> GraphError {
    GraphError::Unavailable {
        reason: e.to_string(),
    }
}

fn query_failed(e: impl std::fmt::Display) -> GraphError {
    GraphError::QueryFailed {
        reason: e.to_string(),
    }
}

/// Keep `[A-Za-z0-9_]`; anything else could break out of the Cypher
/// relationship pattern.
pub fn sanitize_rel_type(rel_type: &str) -> Result<String, GraphError> {
    let clean: String = rel_type
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if clean.is_empty() || clean.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(GraphError::InvalidPattern {
            reason: format!("unusable relationship type {rel_type:?}"),
        });
    }
    Ok(clean)
}

/// [`IGraphStore`] backed by a Neo4j server. Connects on first use, so an
/// engine can start while the database is still down.
pub struct Neo4jGraphStore {
    uri: String,
    user: String,
    password: String,
    database: String,
    max_connections: usize,
    graph: Mutex<Option<Arc<Graph>>>,
}

impl Neo4jGraphStore {
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            uri: config.uri.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
            max_connections: config.pool_size.max(1),
            graph: Mutex::new(None),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    async fn connection(&self) -> Result<Arc<Graph>, GraphError> {
        let mut guard = self.graph.lock().await;
        if let Some(graph) = guard.as_ref() {
            return Ok(Arc::clone(graph));
        }

        let config = ConfigBuilder::default()
            .uri(self.uri.as_str())
            .user(self.user.as_str())
            .password(self.password.as_str())
            .db(self.database.as_str())
            .fetch_size(500)
            .max_connections(self.max_connections)
            .build()
            .map_err(|e| GraphError::Unavailable {
                reason: format!("invalid neo4j config: {e}"),
            })?;
        let graph = Arc::new(Graph::connect(config).await.map_err(unavailable)?);
        tracing::info!(uri = %self.uri, "neo4j connection established");
        *guard = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// One hop out of `frontier` in both directions.
    async fn expand(
        &self,
        graph: &Graph,
        frontier: &[String],
        rel_types: &[String],
    ) -> Result<Vec<(GraphNode, Relationship)>, GraphError> {
        let type_filter = if rel_types.is_empty() {
            ""
        } else {
            " AND type(r) IN $types"
        };
        let cypher = format!(
            "MATCH (a:{label})-[r]-(b:{label}) WHERE a.id IN $ids{type_filter} \
             RETURN b.id AS id, b.kind AS kind, b.label AS label, b.properties AS properties, \
             startNode(r).id AS source, endNode(r).id AS target, type(r) AS rel_type, \
             r.confidence AS confidence",
            label = GRAPH_NODE_LABEL,
        );
        let mut q = query(&cypher).param("ids", frontier.to_vec());
        if !rel_types.is_empty() {
            q = q.param("types", rel_types.to_vec());
        }

        let mut rows = graph.execute(q).await.map_err(unavailable)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(unavailable)? {
            let kind_raw: String = row.get("kind").map_err(query_failed)?;
            let Some(kind) = NodeKind::parse(&kind_raw) else {
                tracing::debug!(kind = %kind_raw, "skipping node of unknown kind");
                continue;
            };
            let properties: BTreeMap<String, String> = row
                .get::<Option<String>>("properties")
                .map_err(query_failed)?
                .and_then(|raw| serde_json::from_str(&raw).ok())
                .unwrap_or_default();
            let node = GraphNode {
                id: row.get("id").map_err(query_failed)?,
                kind,
                label: row.get::<Option<String>>("label").map_err(query_failed)?.unwrap_or_default(),
                properties,
            };
            let rel = Relationship {
                source: row.get("source").map_err(query_failed)?,
                target: row.get("target").map_err(query_failed)?,
                rel_type: row.get("rel_type").map_err(query_failed)?,
                confidence: row.get::<Option<f64>>("confidence").map_err(query_failed)?,
            };
            out.push((node, rel));
        }
        Ok(out)
    }
}

#[async_trait]
impl IGraphStore for Neo4jGraphStore {
    fn name(&self) -> &'static str {
        "neo4j"
    }

    async fn upsert_node(&self, node: &GraphNode) -> Result<(), GraphError> {
        let graph = self.connection().await?;
        let properties = serde_json::to_string(&node.properties).map_err(query_failed)?;
        let cypher = format!(
            "MERGE (n:{GRAPH_NODE_LABEL} {{id: $id}}) \
             SET n.kind = $kind, n.label = $label, n.properties = $properties"
        );
        graph
            .run(
                query(&cypher)
                    .param("id", node.id.as_str())
                    .param("kind", node.kind.as_str())
                    .param("label", node.label.as_str())
                    .param("properties", properties),
            )
            .await
            .map_err(unavailable)
    }

    async fn upsert_relationship(&self, rel: &Relationship) -> Result<(), GraphError> {
        let rel_type = sanitize_rel_type(&rel.rel_type)?;
        let graph = self.connection().await?;
        let set_clause = if rel.confidence.is_some() {
            "SET r.confidence = $confidence"
        } else {
            "REMOVE r.confidence"
        };
        let cypher = format!(
            "MATCH (a:{GRAPH_NODE_LABEL} {{id: $source}}), (b:{GRAPH_NODE_LABEL} {{id: $target}}) \
             MERGE (a)-[r:{rel_type}]->(b) {set_clause} RETURN count(r) AS merged"
        );
        let mut q = query(&cypher)
            .param("source", rel.source.as_str())
            .param("target", rel.target.as_str());
        if let Some(confidence) = rel.confidence {
            q = q.param("confidence", confidence);
        }

        let mut rows = graph.execute(q).await.map_err(unavailable)?;
        let merged: i64 = match rows.next().await.map_err(unavailable)? {
            Some(row) => row.get("merged").map_err(query_failed)?,
            None => 0,
        };
        if merged == 0 {
            return Err(GraphError::QueryFailed {
                reason: format!(
                    "relationship {} -[{}]-> {} references a missing node",
                    rel.source, rel_type, rel.target
                ),
            });
        }
        Ok(())
    }

    async fn query(&self, pattern: &GraphPattern, depth: usize) -> Result<Subgraph, GraphError> {
        validate_pattern(pattern, depth)?;
        let rel_types = pattern
            .rel_types
            .iter()
            .map(|t| sanitize_rel_type(t))
            .collect::<Result<Vec<_>, _>>()?;
        let mut effective = pattern.clone();
        effective.rel_types = rel_types.clone();

        let mut out = Subgraph::default();
        if depth == 0 || pattern.start_ids.is_empty() {
            return Ok(out);
        }
        let graph = self.connection().await?;

        let mut visited: HashSet<String> = pattern.start_ids.iter().cloned().collect();
        let mut walked: HashSet<(String, String, String)> = HashSet::new();
        let mut frontier: Vec<String> = pattern.start_ids.clone();

        for _ in 0..depth {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for (node, rel) in self.expand(&graph, &frontier, &rel_types).await? {
                if !effective.allows_edge(&rel) || !effective.allows_kind(node.kind) {
                    continue;
                }
                let key = (rel.source.clone(), rel.target.clone(), rel.rel_type.clone());
                if walked.insert(key) {
                    out.edges.push(rel);
                }
                if visited.insert(node.id.clone()) {
                    next.push(node.id.clone());
                    out.nodes.push(node);
                }
            }
            frontier = next;
        }
        Ok(out)
    }

    async fn ping(&self) -> Result<(), GraphError> {
        let graph = self.connection().await?;
        let mut rows = graph
            .execute(query("RETURN 1 AS ok"))
            .await
            .map_err(unavailable)?;
        rows.next().await.map_err(unavailable)?;
        Ok(())
    }
}

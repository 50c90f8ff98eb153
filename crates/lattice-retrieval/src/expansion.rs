//! One-hop graph expansion of vector candidates under a deadline.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use lattice_core::errors::GraphError;
use lattice_core::models::{GraphPattern, ScoredEvidence, Subgraph};
use lattice_core::traits::IGraphStore;

/// What the expansion step produced. Each expansion is tagged with the index
/// of its origin; origins that matched nothing, failed, or were cut off by the
/// deadline have no entry.
#[derive(Debug, Default)]
pub struct ExpansionOutcome {
    pub expansions: Vec<(usize, Subgraph)>,
    pub planned: usize,
    pub completed: usize,
    pub failed: usize,
    /// The deadline cut the step short.
    pub truncated: bool,
    pub first_error: Option<GraphError>,
}

impl ExpansionOutcome {
    pub fn had_problems(&self) -> bool {
        self.truncated || self.failed > 0
    }
}

/// Expand each origin by one hop, at most `concurrency` calls in flight.
///
/// Results are consumed in origin order, so when `deadline` fires the kept
/// expansions are always a prefix of the origins and the enrichment is
/// reproducible. A failed call skips that origin and the rest continue.
pub async fn expand_one_hop(
    graph: &dyn IGraphStore,
    origins: &[ScoredEvidence],
    concurrency: usize,
    deadline: Duration,
) -> ExpansionOutcome {
    let mut outcome = ExpansionOutcome {
        planned: origins.len(),
        ..ExpansionOutcome::default()
    };
    if origins.is_empty() {
        return outcome;
    }

    let pending: Vec<_> = origins
        .iter()
        .enumerate()
        .map(|(i, origin)| async move {
            let pattern = GraphPattern::from_start(origin.item.id.clone());
            (i, graph.query(&pattern, 1).await)
        })
        .collect();
    let mut calls = stream::iter(pending).buffered(concurrency.max(1));

    let timer = tokio::time::sleep(deadline);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            biased;
            next = calls.next() => match next {
                Some((i, Ok(subgraph))) => {
                    outcome.completed += 1;
                    if !subgraph.is_empty() {
                        outcome.expansions.push((i, subgraph));
                    }
                }
                Some((i, Err(e))) => {
                    tracing::debug!(origin = %origins[i].item.id, error = %e, "graph expansion call failed");
                    outcome.failed += 1;
                    if outcome.first_error.is_none() {
                        outcome.first_error = Some(e);
                    }
                }
                None => break,
            },
            _ = &mut timer => {
                outcome.truncated = true;
                break;
            }
        }
    }
    outcome
}

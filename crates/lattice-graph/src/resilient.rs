//! Timeout, bounded pool, and retry with capped exponential backoff around
//! any [`IGraphStore`].

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Semaphore;

use lattice_core::config::GraphConfig;
use lattice_core::errors::GraphError;
use lattice_core::models::{GraphNode, GraphPattern, Relationship, Subgraph};
use lattice_core::traits::IGraphStore;

/// Retry and timeout tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff before the first retry. Doubles each retry.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Applies to each attempt and to waiting for a pool slot.
    pub request_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: config.retry_delay(),
            max_backoff: config.max_retry_delay(),
            request_timeout: config.request_timeout(),
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Counters exposed to the ops surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResilienceStats {
    pub calls: u64,
    pub attempts: u64,
    pub retries: u64,
    pub failures: u64,
    pub timeouts: u64,
}

#[derive(Debug, Default)]
struct Counters {
    calls: AtomicU64,
    attempts: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
}

/// Wraps a store so callers never wait longer than the policy allows.
///
/// Retryable errors (unavailable, timeout, pool exhausted) are retried;
/// when retries run out the caller gets [`GraphError::RetriesExhausted`].
/// Other errors return immediately. `ping` makes a single bounded attempt so
/// health probes see each outcome individually.
pub struct ResilientGraphStore {
    inner: Arc<dyn IGraphStore>,
    policy: RetryPolicy,
    pool: Semaphore,
    counters: Counters,
}

impl ResilientGraphStore {
    pub fn new(inner: Arc<dyn IGraphStore>, policy: RetryPolicy, pool_size: usize) -> Self {
        Self {
            inner,
            policy,
            pool: Semaphore::new(pool_size.max(1)),
            counters: Counters::default(),
        }
    }

    pub fn from_config(inner: Arc<dyn IGraphStore>, config: &GraphConfig) -> Self {
        Self::new(inner, RetryPolicy::from_config(config), config.pool_size)
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &Arc<dyn IGraphStore> {
        &self.inner
    }

    pub fn stats(&self) -> ResilienceStats {
        ResilienceStats {
            calls: self.counters.calls.load(Ordering::Relaxed),
            attempts: self.counters.attempts.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            timeouts: self.counters.timeouts.load(Ordering::Relaxed),
        }
    }

    /// One attempt: wait for a pool slot, then run `op` under the timeout.
    async fn attempt<T, F, Fut>(&self, operation: &str, op: &F) -> Result<T, GraphError>
    where
        F: Fn() -> Fut + Sync,
        Fut: Future<Output = Result<T, GraphError>> + Send,
    {
        let timeout = self.policy.request_timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let _permit = match tokio::time::timeout(timeout, self.pool.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(GraphError::Unavailable {
                    reason: "graph connection pool closed".to_string(),
                })
            }
            Err(_) => return Err(GraphError::PoolExhausted { waited_ms: timeout_ms }),
        };

        self.counters.attempts.fetch_add(1, Ordering::Relaxed);
        match tokio::time::timeout(timeout, op()).await {
            Ok(result) => result,
            Err(_) => {
                self.counters.timeouts.fetch_add(1, Ordering::Relaxed);
                Err(GraphError::Timeout {
                    operation: operation.to_string(),
                    timeout_ms,
                })
            }
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> Result<T, GraphError>
    where
        F: Fn() -> Fut + Sync,
        Fut: Future<Output = Result<T, GraphError>> + Send,
    {
        self.counters.calls.fetch_add(1, Ordering::Relaxed);
        let mut last_error = String::new();

        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                let backoff = self.policy.backoff(attempt);
                tracing::debug!(
                    operation,
                    attempt,
                    max_retries = self.policy.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "graph: retrying"
                );
                self.counters.retries.fetch_add(1, Ordering::Relaxed);
                tokio::time::sleep(backoff).await;
            }

            match self.attempt(operation, &op).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    tracing::debug!(operation, attempt, error = %e, "graph: attempt failed");
                    last_error = e.to_string();
                }
                Err(e) => {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                    return Err(e);
                }
            }
        }

        self.counters.failures.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            operation,
            attempts = self.policy.max_retries + 1,
            error = %last_error,
            "graph: retries exhausted"
        );
        Err(GraphError::RetriesExhausted {
            operation: operation.to_string(),
            attempts: self.policy.max_retries + 1,
            last_error,
        })
    }
}

#[async_trait]
impl IGraphStore for ResilientGraphStore {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn upsert_node(&self, node: &GraphNode) -> Result<(), GraphError> {
        self.with_retry("upsert_node", || self.inner.upsert_node(node))
            .await
    }

    async fn upsert_relationship(&self, rel: &Relationship) -> Result<(), GraphError> {
        self.with_retry("upsert_relationship", || self.inner.upsert_relationship(rel))
            .await
    }

    async fn query(&self, pattern: &GraphPattern, depth: usize) -> Result<Subgraph, GraphError> {
        self.with_retry("query", || self.inner.query(pattern, depth))
            .await
    }

    async fn ping(&self) -> Result<(), GraphError> {
        self.counters.calls.fetch_add(1, Ordering::Relaxed);
        let result = self.attempt("ping", &|| self.inner.ping()).await;
        if result.is_err() {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(500),
            request_timeout: Duration::from_millis(1000),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy();
        assert_eq!(p.backoff(1), Duration::from_millis(200));
        assert_eq!(p.backoff(2), Duration::from_millis(400));
        assert_eq!(p.backoff(3), Duration::from_millis(500));
        assert_eq!(p.backoff(40), Duration::from_millis(500));
    }

    #[test]
    fn policy_reads_config() {
        let config = GraphConfig::default();
        let p = RetryPolicy::from_config(&config);
        assert_eq!(p.max_retries, config.max_retries);
        assert_eq!(p.request_timeout, config.request_timeout());
    }
}

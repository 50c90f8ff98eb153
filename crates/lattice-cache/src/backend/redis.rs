//! Networked store shared by every instance pointing at the same Redis.
//!
//! The connection is established lazily on first use. After a failed
//! connect, further attempts wait out a cooldown so a dead server costs one
//! timeout per window rather than one per call. Every command is bounded by
//! the configured operation timeout.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lattice_core::errors::CacheError;
use lattice_core::traits::ICacheBackend;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use tokio::sync::Mutex as AsyncMutex;

const BACKEND: &str = "redis";
const SCAN_BATCH: usize = 500;

pub struct RedisCacheBackend {
    client: Client,
    /// Prepended to every key, e.g. `lattice:search:`.
    key_prefix: String,
    manager: AsyncMutex<Option<ConnectionManager>>,
    last_connect_failure: Mutex<Option<Instant>>,
    op_timeout: Duration,
    reconnect_cooldown: Duration,
}

impl RedisCacheBackend {
    /// Build a backend; no network traffic happens until the first call.
    pub fn new(
        url: &str,
        key_prefix: impl Into<String>,
        op_timeout: Duration,
        reconnect_cooldown: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(|e| CacheError::Unreachable {
            backend: BACKEND.to_string(),
            reason: format!("invalid redis url: {e}"),
        })?;
        Ok(Self {
            client,
            key_prefix: key_prefix.into(),
            manager: AsyncMutex::new(None),
            last_connect_failure: Mutex::new(None),
            op_timeout,
            reconnect_cooldown,
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn in_cooldown(&self) -> bool {
        let guard = self
            .last_connect_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        guard.map_or(false, |at| at.elapsed() < self.reconnect_cooldown)
    }

    fn note_connect_failure(&self) {
        let mut guard = self
            .last_connect_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *guard = Some(Instant::now());
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let mut slot = self.manager.lock().await;
        if let Some(manager) = slot.as_ref() {
            return Ok(manager.clone());
        }
        if self.in_cooldown() {
            return Err(CacheError::Unreachable {
                backend: BACKEND.to_string(),
                reason: "reconnect cooling down".to_string(),
            });
        }
        let connect = ConnectionManager::new(self.client.clone());
        match tokio::time::timeout(self.op_timeout, connect).await {
            Ok(Ok(manager)) => {
                tracing::info!(prefix = %self.key_prefix, "redis cache connected");
                *slot = Some(manager.clone());
                Ok(manager)
            }
            Ok(Err(e)) => {
                self.note_connect_failure();
                Err(classify(e))
            }
            Err(_) => {
                self.note_connect_failure();
                Err(self.timeout_error())
            }
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => Err(self.timeout_error()),
        }
    }

    fn timeout_error(&self) -> CacheError {
        CacheError::Timeout {
            backend: BACKEND.to_string(),
            timeout_ms: self.op_timeout.as_millis() as u64,
        }
    }

    /// Keys under `prefix`, already namespaced.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}{}*", escape_glob(&self.key_prefix), escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = self
                .bounded(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys)
    }
}

#[async_trait]
impl ICacheBackend for RedisCacheBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        let key = self.full_key(key);
        self.bounded(conn.get::<_, Option<Vec<u8>>>(key)).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let ttl_ms = ttl.as_millis().max(1) as u64;
        self.bounded(
            redis::cmd("SET")
                .arg(self.full_key(key))
                .arg(value)
                .arg("PX")
                .arg(ttl_ms)
                .query_async::<_, ()>(&mut conn),
        )
        .await
    }

    async fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let removed: u64 = self.bounded(conn.del(self.full_key(key))).await?;
        Ok(removed > 0)
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let keys = self.scan_prefix(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        let mut removed = 0u64;
        for batch in keys.chunks(SCAN_BATCH) {
            let n: u64 = self.bounded(conn.del(batch)).await?;
            removed += n;
        }
        Ok(removed)
    }

    async fn size(&self) -> Result<u64, CacheError> {
        Ok(self.scan_prefix("").await?.len() as u64)
    }
}

/// Transport failures mean the server is unreachable; anything else is a
/// server-side rejection of the command.
fn classify(e: RedisError) -> CacheError {
    if e.is_io_error()
        || e.is_connection_refusal()
        || e.is_connection_dropped()
        || e.is_timeout()
    {
        CacheError::Unreachable {
            backend: BACKEND.to_string(),
            reason: e.to_string(),
        }
    } else {
        CacheError::Backend {
            reason: format!("{BACKEND}: {e}"),
        }
    }
}

/// Escape Redis glob metacharacters so a prefix matches literally.
fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

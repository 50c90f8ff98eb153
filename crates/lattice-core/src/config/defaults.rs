// Single source of truth for all default values.

// --- Cache ---
pub const DEFAULT_CACHE_BACKEND: &str = "memory";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_EMBEDDING_TTL_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_SEARCH_TTL_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_EMBEDDING_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_ENTITY_CACHE_SIZE: u64 = 5_000;
pub const DEFAULT_SEARCH_CACHE_SIZE: u64 = 2_000;
pub const DEFAULT_CACHE_OP_TIMEOUT_MS: u64 = 250;
pub const DEFAULT_CACHE_RECONNECT_COOLDOWN_MS: u64 = 5_000;
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "lattice";

// --- Vector ---
pub const DEFAULT_VECTOR_BACKEND: &str = "flat";
pub const DEFAULT_PARALLEL_SCAN_THRESHOLD: usize = 4_096;
pub const DEFAULT_PERSIST_ON_SHUTDOWN: bool = true;

// --- Graph ---
pub const DEFAULT_GRAPH_BACKEND: &str = "memory";
pub const DEFAULT_GRAPH_URI: &str = "bolt://127.0.0.1:7687";
pub const DEFAULT_GRAPH_USER: &str = "neo4j";
pub const DEFAULT_GRAPH_DATABASE: &str = "neo4j";
pub const DEFAULT_GRAPH_MAX_RETRIES: u32 = 3;
pub const DEFAULT_GRAPH_RETRY_DELAY_MS: u64 = 200;
pub const DEFAULT_GRAPH_MAX_RETRY_DELAY_MS: u64 = 5_000;
pub const DEFAULT_GRAPH_REQUEST_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_GRAPH_POOL_SIZE: usize = 8;

// --- Health ---
pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 15_000;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 3;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_FORCE_VECTOR_ONLY: bool = false;

// --- Retrieval ---
pub const DEFAULT_MAX_K: usize = 100;
pub const DEFAULT_OVERFETCH_FACTOR: usize = 2;
pub const DEFAULT_GRAPH_DISCOUNT: f64 = 0.5;
pub const DEFAULT_EXPANSION_TIMEOUT_MS: u64 = 1_500;
pub const DEFAULT_EXPANSION_CONCURRENCY: usize = 4;
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;

// --- Observability ---
pub const DEFAULT_LOG_FILTER: &str = "lattice=info";
pub const DEFAULT_JSON_LOGS: bool = false;
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 256;
pub const DEFAULT_LATENCY_WINDOW: usize = 1_024;
pub const DEFAULT_ALERT_WINDOW_SECS: u64 = 3_600;

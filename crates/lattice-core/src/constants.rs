/// Lattice version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "LATTICE_LOG";

/// Prefix shared by every configuration environment override.
pub const ENV_PREFIX: &str = "LATTICE_";

/// Hard ceiling on graph traversal depth accepted by any store.
pub const MAX_GRAPH_TRAVERSAL_DEPTH: usize = 8;

/// Label applied to every node the engine writes into a remote graph.
pub const GRAPH_NODE_LABEL: &str = "LatticeNode";

/// Separator between cache key segments.
pub const CACHE_KEY_SEPARATOR: char = ':';

/// Magic header of the flat vector snapshot format.
pub const VECTOR_SNAPSHOT_MAGIC: &[u8; 8] = b"LATVEC01";

/// Suffix of the temporary file written before an atomic rename.
pub const TEMP_FILE_SUFFIX: &str = "tmp";

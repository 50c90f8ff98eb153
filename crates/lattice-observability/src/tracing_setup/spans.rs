//! Span definitions per operation.

/// Span around one retrieval request.
#[macro_export]
macro_rules! retrieval_span {
    ($query_id:expr, $k:expr) => {
        tracing::info_span!("lattice.retrieval", query_id = %$query_id, k = $k)
    };
}

/// Span around the graph expansion step of a request.
#[macro_export]
macro_rules! graph_expansion_span {
    ($candidates:expr, $state:expr) => {
        tracing::debug_span!("lattice.graph_expansion", candidates = $candidates, state = %$state)
    };
}

/// Span around one health probe.
#[macro_export]
macro_rules! probe_span {
    ($store:expr) => {
        tracing::debug_span!("lattice.probe", store = %$store)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RETRIEVAL: &str = "lattice.retrieval";
    pub const GRAPH_EXPANSION: &str = "lattice.graph_expansion";
    pub const PROBE: &str = "lattice.probe";
}

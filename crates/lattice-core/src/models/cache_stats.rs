use serde::{Deserialize, Serialize};

/// The three cache instances the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Embedding,
    Entity,
    SearchResult,
}

impl CacheKind {
    pub const ALL: [CacheKind; 3] = [Self::Embedding, Self::Entity, Self::SearchResult];

    /// Key namespace; keeps the three caches apart on a shared backend.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Embedding => "emb",
            Self::Entity => "ent",
            Self::SearchResult => "search",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embedding" | "emb" => Some(Self::Embedding),
            "entity" | "ent" => Some(Self::Entity),
            "search" | "search_result" | "search-result" => Some(Self::SearchResult),
            _ => None,
        }
    }
}

impl std::fmt::Display for CacheKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Aggregate counters for one cache instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub kind: CacheKind,
    pub backend: String,
    pub hits: u64,
    pub misses: u64,
    pub size: u64,
    pub hit_rate: f64,
    /// True while the backend is failing and the cache acts as a no-op.
    pub degraded: bool,
}

impl CacheStats {
    pub fn compute_hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_namespaces_and_names() {
        for kind in CacheKind::ALL {
            assert_eq!(CacheKind::parse(kind.namespace()), Some(kind));
        }
        assert_eq!(CacheKind::parse("Search-Result"), Some(CacheKind::SearchResult));
        assert_eq!(CacheKind::parse("l2"), None);
    }

    #[test]
    fn hit_rate_handles_zero() {
        assert_eq!(CacheStats::compute_hit_rate(0, 0), 0.0);
        assert!((CacheStats::compute_hit_rate(3, 1) - 0.75).abs() < f64::EPSILON);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability of the graph store as seen by the health monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityState {
    Healthy,
    /// Graph queries are still attempted but treated as best-effort.
    Degraded,
    Unreachable,
}

impl AvailabilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unreachable => "unreachable",
        }
    }

    /// Whether the orchestrator should attempt graph expansion.
    pub fn allows_graph(&self) -> bool {
        !matches!(self, Self::Unreachable)
    }

    pub fn to_bits(self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::Degraded => 1,
            Self::Unreachable => 2,
        }
    }

    /// Unknown bit patterns decode to `Unreachable`.
    pub fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::Healthy,
            1 => Self::Degraded,
            _ => Self::Unreachable,
        }
    }
}

impl std::fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single health probe against the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub at: DateTime<Utc>,
    pub success: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn success(latency_ms: u64) -> Self {
        Self {
            at: Utc::now(),
            success: true,
            latency_ms,
            error: None,
        }
    }

    pub fn failure(latency_ms: u64, error: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            success: false,
            latency_ms,
            error: Some(error.into()),
        }
    }
}

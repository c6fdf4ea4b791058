// Probe Result - one reachability observation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single probe against the reachability target.
///
/// Produced fresh per probe call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub reachable: bool,
    pub observed_at: DateTime<Utc>,
    pub latency: Option<Duration>,
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn success(observed_at: DateTime<Utc>, latency: Option<Duration>) -> Self {
        Self {
            reachable: true,
            observed_at,
            latency,
            error: None,
        }
    }

    pub fn failure(observed_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            reachable: false,
            observed_at,
            latency: None,
            error: Some(error.into()),
        }
    }

    /// Latency in milliseconds, if the probe measured one
    pub fn latency_ms(&self) -> Option<f64> {
        self.latency.map(|d| d.as_secs_f64() * 1000.0)
    }
}

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// Health classification of an endpoint, derived from recent drop counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Unknown,
    Green,
    Amber,
    Red,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Unknown => write!(f, "unknown"),
            HealthStatus::Green => write!(f, "green"),
            HealthStatus::Amber => write!(f, "amber"),
            HealthStatus::Red => write!(f, "red"),
        }
    }
}

/// Outcome of a single probe of one endpoint
#[derive(Debug, Clone, Copy)]
pub struct HistoryPoint {
    /// Wall-clock time the result was recorded
    pub timestamp: SystemTime,

    /// Whether the endpoint answered
    pub success: bool,

    /// Round-trip time in milliseconds, when one was measured
    pub latency_ms: Option<u64>,
}

impl HistoryPoint {
    /// The endpoint answered; `latency_ms` may be absent when the transport
    /// could not measure one.
    pub fn success(timestamp: SystemTime, latency_ms: Option<u64>) -> Self {
        Self { timestamp, success: true, latency_ms }
    }

    /// The endpoint did not answer. Failed probes never carry a latency.
    pub fn failure(timestamp: SystemTime) -> Self {
        Self { timestamp, success: false, latency_ms: None }
    }

    /// Age of this point relative to `now`. Points stamped ahead of `now`
    /// (clock adjustments) count as age zero.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.timestamp).unwrap_or_default()
    }
}

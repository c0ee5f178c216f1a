use std::time::{Duration, SystemTime};

use crate::registry::{Endpoint, EndpointRegistry};

use super::types::HealthStatus;

/// Rolling window the display figures are computed over
const STATS_WINDOW: Duration = Duration::from_secs(60);

/// Read-only display figures for one endpoint.
///
/// Pure projection of the endpoint's history at evaluation time `now`; safe
/// to recompute arbitrarily often.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EndpointStats {
    /// Latency of the most recent probe, if it measured one
    pub last_latency_ms: Option<u64>,

    /// Mean latency over successful probes in the last 60 seconds
    pub average_latency_ms: Option<f64>,

    /// Share of successful probes in the last 60 seconds, rounded to the
    /// nearest whole percent. Absent while the window is empty.
    pub uptime_percent: Option<u8>,
}

impl EndpointStats {
    pub fn collect(endpoint: &Endpoint, now: SystemTime) -> Self {
        let recent: Vec<_> = endpoint.history().window(STATS_WINDOW, now).collect();

        // Only successful probes that actually measured a latency enter the
        // mean; successes without a measurement still count for uptime.
        let latencies: Vec<u64> = recent
            .iter()
            .filter(|point| point.success)
            .filter_map(|point| point.latency_ms)
            .collect();
        let average_latency_ms = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<u64>() as f64 / latencies.len() as f64)
        };

        let uptime_percent = if recent.is_empty() {
            None
        } else {
            let successes = recent.iter().filter(|point| point.success).count();
            Some((100.0 * successes as f64 / recent.len() as f64).round() as u8)
        };

        Self { last_latency_ms: endpoint.last_latency_ms(), average_latency_ms, uptime_percent }
    }

    pub fn latency_text(&self) -> String {
        match self.last_latency_ms {
            Some(ms) => format!("{ms} ms"),
            None => "--".to_string(),
        }
    }

    pub fn average_text(&self) -> String {
        match self.average_latency_ms {
            Some(avg) => format!("{avg:.0} ms"),
            None => "--".to_string(),
        }
    }

    pub fn uptime_text(&self) -> String {
        match self.uptime_percent {
            Some(percent) => format!("{percent}%"),
            None => "--".to_string(),
        }
    }
}

/// Fleet-wide summary across every registered endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetSummary {
    pub targets: usize,
    pub healthy: usize,
    pub critical: usize,
}

impl FleetSummary {
    pub fn collect(registry: &EndpointRegistry) -> Self {
        let mut summary = Self { targets: registry.len(), ..Self::default() };
        for endpoint in registry.list() {
            match endpoint.last_status() {
                HealthStatus::Green => summary.healthy += 1,
                HealthStatus::Amber | HealthStatus::Red => summary.critical += 1,
                HealthStatus::Unknown => {}
            }
        }
        summary
    }
}

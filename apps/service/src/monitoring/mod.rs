//! Monitoring engine - the probe/record/classify loop.
//!
//! This module is responsible for:
//! - Probing endpoint reachability through the `Prober` capability
//! - Keeping the bounded per-endpoint probe history
//! - Classifying endpoint health from recent drop patterns
//! - Deriving the rolling display statistics
//! - Scheduling periodic probe cycles

pub mod classifier;
pub mod history;
pub mod prober;
pub mod scheduler;
pub mod stats;
pub mod types;

#[cfg(test)]
mod tests;

pub use history::{HISTORY_CAPACITY, History};
pub use prober::{HttpProber, PingProber, Prober};
pub use scheduler::MonitorScheduler;
pub use stats::{EndpointStats, FleetSummary};
pub use types::{HealthStatus, HistoryPoint};

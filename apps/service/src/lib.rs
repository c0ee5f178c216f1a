//! NetPulse service - periodic reachability monitoring for a small set of
//! network endpoints.
//!
//! The engine is split into the endpoint registry (validated, deduped watch
//! list), the monitoring module (prober capability, bounded history, health
//! classifier, stats, scheduler), and the TOML config/snapshot layer.

pub mod config;
pub mod monitoring;
pub mod registry;

pub use config::Config;
pub use monitoring::MonitorScheduler;
pub use registry::{EndpointRegistry, RegistryError};

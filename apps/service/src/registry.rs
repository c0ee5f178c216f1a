//! Endpoint registry - the owned set of monitored targets.
//!
//! The registry normalizes raw user input into a canonical
//! (display text, bare host) pair, enforces the capacity limit and
//! case-insensitive host uniqueness, and hands out endpoints in stable
//! insertion order. It performs no network or file I/O of its own.

use std::time::SystemTime;

use thiserror::Error;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::monitoring::classifier::classify;
use crate::monitoring::history::History;
use crate::monitoring::types::{HealthStatus, HistoryPoint};

/// Maximum number of endpoints a registry will track
pub const MAX_ENDPOINTS: usize = 5;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid target: enter a valid hostname, IP, or URL")]
    InvalidTarget,

    #[error("limit reached: up to {MAX_ENDPOINTS} targets can be monitored")]
    LimitReached,

    #[error("host is already in the watch list: {0}")]
    DuplicateHost(String),
}

/// A monitored network target with its probe history and derived health
#[derive(Debug)]
pub struct Endpoint {
    id: Uuid,
    display: String,
    host: String,
    history: History,
    last_status: HealthStatus,
    last_latency_ms: Option<u64>,
}

impl Endpoint {
    fn new(display: String, host: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            display,
            host,
            history: History::new(),
            last_status: HealthStatus::Unknown,
            last_latency_ms: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Canonical user-facing text, e.g. with an inferred scheme.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Bare hostname or IP handed to the prober.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn last_status(&self) -> HealthStatus {
        self.last_status
    }

    pub fn last_latency_ms(&self) -> Option<u64> {
        self.last_latency_ms
    }

    /// Record one probe outcome and refresh the cached classification in the
    /// same call. History is the single source of truth; `last_status` and
    /// `last_latency_ms` are caches that are never left stale across an
    /// append.
    pub fn record(&mut self, point: HistoryPoint, now: SystemTime) {
        self.last_latency_ms = point.latency_ms;
        self.history.record(point);
        self.last_status = classify(&self.history, now);
    }
}

/// Owned, bounded set of monitored endpoints
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize raw input into a (display text, bare host) pair.
    ///
    /// Input without a recognizable scheme is displayed with an inferred
    /// `https://`. The host is always the bare hostname/IP, with IPv6
    /// bracket delimiters stripped. Fails when no host can be extracted.
    pub fn normalize(raw: &str) -> Result<(String, String), RegistryError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(RegistryError::InvalidTarget);
        }

        let display = if text.contains("://") {
            text.to_string()
        } else {
            format!("https://{text}")
        };

        let url = Url::parse(&display).map_err(|_| RegistryError::InvalidTarget)?;
        let host = url
            .host_str()
            .ok_or(RegistryError::InvalidTarget)?
            .trim_matches(['[', ']'])
            .to_string();
        if host.is_empty() {
            return Err(RegistryError::InvalidTarget);
        }

        Ok((display, host))
    }

    /// Validate, dedup, and append a new endpoint with empty history and
    /// unknown status.
    pub fn add(&mut self, raw: &str) -> Result<&Endpoint, RegistryError> {
        let (display_text, host) = Self::normalize(raw)?;

        if self.endpoints.len() >= MAX_ENDPOINTS {
            return Err(RegistryError::LimitReached);
        }
        if self.endpoints.iter().any(|e| e.host.eq_ignore_ascii_case(&host)) {
            return Err(RegistryError::DuplicateHost(host));
        }

        info!("Target added: {display_text}");
        self.endpoints.push(Endpoint::new(display_text, host));
        Ok(self.endpoints.last().expect("endpoint was just appended"))
    }

    /// Delete an endpoint and its history. Returns false (a silent no-op)
    /// when the id is not present.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let Some(index) = self.endpoints.iter().position(|e| e.id == id) else {
            return false;
        };
        let endpoint = self.endpoints.remove(index);
        info!("Target removed: {}", endpoint.display);
        true
    }

    /// Endpoints in stable insertion order.
    pub fn list(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn get(&self, id: Uuid) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Endpoint> {
        self.endpoints.iter_mut().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::registry::EndpointRegistry;

use super::prober::Prober;
use super::stats::FleetSummary;
use super::types::HistoryPoint;

/// Drives periodic probe cycles over every registered endpoint.
///
/// Two-state machine (stopped/running). While running, a single driver task
/// owns the timing source; the registry it probes is shared and may be
/// mutated between cycles by external callers.
pub struct MonitorScheduler {
    registry: Arc<RwLock<EndpointRegistry>>,
    prober: Arc<dyn Prober>,
    interval: Duration,
    driver: Option<JoinHandle<()>>,
}

impl MonitorScheduler {
    pub fn new(
        registry: Arc<RwLock<EndpointRegistry>>,
        prober: Arc<dyn Prober>,
        interval: Duration,
    ) -> Self {
        Self { registry, prober, interval, driver: None }
    }

    pub fn is_running(&self) -> bool {
        self.driver.as_ref().is_some_and(|driver| !driver.is_finished())
    }

    /// Start periodic probing. The first cycle runs immediately; afterwards
    /// cycles run inline in the driver task, so a cycle slower than the
    /// interval delays the next tick rather than overlapping it. No-op when
    /// already running.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Monitoring already running; start ignored");
            return;
        }

        let registry = Arc::clone(&self.registry);
        let prober = Arc::clone(&self.prober);
        let period = self.interval;

        info!("Monitoring started");
        self.driver = Some(tokio::spawn(async move {
            let mut timer = interval(period);
            loop {
                timer.tick().await;
                run_probe_cycle(&registry, prober.as_ref()).await;
            }
        }));
    }

    /// Stop periodic probing. The driver task is aborted: an in-flight cycle
    /// is discarded along with its pending results, and no further cycle is
    /// scheduled. No-op when already stopped.
    pub fn stop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
            info!("Monitoring stopped");
        }
    }
}

impl Drop for MonitorScheduler {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

/// One probe cycle: check every endpoint registered at cycle start.
///
/// The (id, host) set is snapshotted up front so concurrent add/remove
/// cannot corrupt iteration; an endpoint removed while its probe is in
/// flight is skipped when the result lands. Probes run sequentially, which
/// keeps at most one probe outstanding per endpoint, and each endpoint's
/// history is only written under the registry's write lock. A failed probe
/// is a normal outcome: it is recorded as a failed point and the cycle
/// moves on to the remaining endpoints.
pub(crate) async fn run_probe_cycle(registry: &RwLock<EndpointRegistry>, prober: &dyn Prober) {
    let targets: Vec<(Uuid, String)> = registry
        .read()
        .await
        .list()
        .iter()
        .map(|endpoint| (endpoint.id(), endpoint.host().to_string()))
        .collect();

    for (id, host) in targets {
        let outcome = prober.probe(&host).await;
        let now = SystemTime::now();
        let point = match outcome {
            Ok(latency_ms) => HistoryPoint::success(now, latency_ms),
            Err(reason) => {
                debug!("Probe failed for {host}: {reason:#}");
                HistoryPoint::failure(now)
            }
        };

        let mut registry = registry.write().await;
        let Some(endpoint) = registry.get_mut(id) else {
            continue;
        };

        let previous = endpoint.last_status();
        endpoint.record(point, now);
        if endpoint.last_status() != previous {
            info!(
                "{} changed status: {} -> {}",
                endpoint.display(),
                previous,
                endpoint.last_status()
            );
        }
    }

    let registry = registry.read().await;
    let summary = FleetSummary::collect(&registry);
    debug!(
        "Cycle complete: {} targets, {} healthy, {} critical",
        summary.targets, summary.healthy, summary.critical
    );
}

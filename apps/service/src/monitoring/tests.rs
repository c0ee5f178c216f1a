//! Engine-level tests: probe cycles and scheduler lifecycle, driven by a
//! scripted prober so no real network access is needed.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::RwLock;

use crate::registry::EndpointRegistry;

use super::prober::Prober;
use super::scheduler::{MonitorScheduler, run_probe_cycle};
use super::types::HealthStatus;

/// Scripted prober: hosts listed in `failing` are reported down, everything
/// else answers with a fixed latency. Counts every probe issued.
struct MockProber {
    latency_ms: Option<u64>,
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl MockProber {
    fn healthy(latency_ms: u64) -> Self {
        Self { latency_ms: Some(latency_ms), failing: Vec::new(), calls: AtomicUsize::new(0) }
    }

    fn failing_for(host: &str) -> Self {
        Self {
            latency_ms: Some(10),
            failing: vec![host.to_string()],
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Prober for MockProber {
    async fn probe(&self, host: &str) -> Result<Option<u64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|h| h == host) {
            return Err(anyhow!("scripted failure for {host}"));
        }
        Ok(self.latency_ms)
    }
}

fn registry_with(targets: &[&str]) -> Arc<RwLock<EndpointRegistry>> {
    let mut registry = EndpointRegistry::new();
    for target in targets {
        registry.add(target).unwrap();
    }
    Arc::new(RwLock::new(registry))
}

#[tokio::test]
async fn a_cycle_records_a_point_for_every_endpoint() {
    let registry = registry_with(&["example.com", "8.8.8.8"]);
    let prober = MockProber::healthy(12);

    run_probe_cycle(&registry, &prober).await;

    let registry = registry.read().await;
    for endpoint in registry.list() {
        assert_eq!(endpoint.history().len(), 1);
        assert_eq!(endpoint.last_status(), HealthStatus::Green);
        assert_eq!(endpoint.last_latency_ms(), Some(12));
    }
    assert_eq!(prober.calls(), 2);
}

#[tokio::test]
async fn one_endpoint_failing_does_not_disturb_the_others() {
    let registry = registry_with(&["good.example", "bad.example"]);
    let prober = MockProber::failing_for("bad.example");

    run_probe_cycle(&registry, &prober).await;
    run_probe_cycle(&registry, &prober).await;

    let registry = registry.read().await;
    let good = registry.list().iter().find(|e| e.host() == "good.example").unwrap();
    let bad = registry.list().iter().find(|e| e.host() == "bad.example").unwrap();

    assert!(good.history().latest().unwrap().success);
    assert_eq!(good.last_status(), HealthStatus::Green);
    assert_eq!(good.last_latency_ms(), Some(10));

    assert!(!bad.history().latest().unwrap().success);
    assert_eq!(bad.last_latency_ms(), None);
    assert_eq!(bad.history().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn double_start_runs_a_single_probe_driver() {
    let registry = registry_with(&["example.com"]);
    let prober = Arc::new(MockProber::healthy(5));
    let mut scheduler = MonitorScheduler::new(
        Arc::clone(&registry),
        prober.clone(),
        Duration::from_secs(3),
    );

    scheduler.start();
    scheduler.start();
    assert!(scheduler.is_running());

    // One immediate cycle plus one after the interval elapses. A second
    // driver would double these counts.
    tokio::time::sleep(Duration::from_millis(3100)).await;
    scheduler.stop();

    assert_eq!(prober.calls(), 2);
    assert!(!scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_any_further_cycles() {
    let registry = registry_with(&["example.com"]);
    let prober = Arc::new(MockProber::healthy(5));
    let mut scheduler = MonitorScheduler::new(
        Arc::clone(&registry),
        prober.clone(),
        Duration::from_secs(3),
    );

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(prober.calls(), 1);

    scheduler.stop();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(prober.calls(), 1);

    // Stopping again is a no-op.
    scheduler.stop();
}

#[tokio::test(start_paused = true)]
async fn endpoints_added_between_cycles_are_picked_up() {
    let registry = registry_with(&[]);
    let prober = Arc::new(MockProber::healthy(5));
    let mut scheduler = MonitorScheduler::new(
        Arc::clone(&registry),
        prober.clone(),
        Duration::from_secs(3),
    );

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(prober.calls(), 0);

    registry.write().await.add("example.com").unwrap();
    tokio::time::sleep(Duration::from_millis(3100)).await;
    scheduler.stop();

    assert_eq!(prober.calls(), 1);
}

#[tokio::test]
async fn endpoints_removed_mid_cycle_are_skipped() {
    // A prober that removes the second endpoint from the registry while the
    // first probe is in flight, so the cycle's snapshot goes stale.
    struct RemovingProber {
        registry: Arc<RwLock<EndpointRegistry>>,
        victim: tokio::sync::Mutex<Option<uuid::Uuid>>,
    }

    #[async_trait::async_trait]
    impl Prober for RemovingProber {
        async fn probe(&self, _host: &str) -> Result<Option<u64>> {
            if let Some(victim) = self.victim.lock().await.take() {
                self.registry.write().await.remove(victim);
            }
            Ok(Some(7))
        }
    }

    let registry = registry_with(&["first.example", "second.example"]);
    let victim = registry
        .read()
        .await
        .list()
        .iter()
        .find(|e| e.host() == "second.example")
        .unwrap()
        .id();
    let prober = RemovingProber {
        registry: Arc::clone(&registry),
        victim: tokio::sync::Mutex::new(Some(victim)),
    };

    run_probe_cycle(&registry, &prober).await;

    let registry = registry.read().await;
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.list()[0].host(), "first.example");
    assert_eq!(registry.list()[0].history().len(), 1);
}

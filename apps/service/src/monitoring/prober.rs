use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use tokio::process::Command;
use tokio::time::timeout;

/// Grace added on top of the configured timeout so a wedged transport can
/// never stall a cycle indefinitely.
const PROBE_GRACE: Duration = Duration::from_secs(1);

/// Reachability capability for a single endpoint host.
///
/// `Ok(latency)` means the host answered, with the round-trip time in
/// milliseconds when one was measured. `Err` is a normal failed-check
/// outcome: the scheduler absorbs it into history as a failed point, it is
/// never propagated further. Implementations must return within their
/// configured timeout plus a small grace.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str) -> Result<Option<u64>>;
}

/// Probes by invoking the system `ping` utility once per check.
///
/// A missing `ping` binary, a non-zero exit, or a timeout all come back as
/// `Err` and are recorded as failed checks.
pub struct PingProber {
    timeout_seconds: u64,
}

impl PingProber {
    pub fn new(timeout_seconds: u64) -> Self {
        Self { timeout_seconds }
    }
}

#[async_trait::async_trait]
impl Prober for PingProber {
    async fn probe(&self, host: &str) -> Result<Option<u64>> {
        let mut command = Command::new("ping");
        command
            .arg("-c")
            .arg("1")
            .arg("-W")
            .arg(self.timeout_seconds.to_string())
            .arg(host);

        let output = timeout(Duration::from_secs(self.timeout_seconds) + PROBE_GRACE, command.output())
            .await
            .map_err(|_| anyhow!("ping timed out for {host}"))?
            .map_err(|e| anyhow!("failed to run ping: {e}"))?;

        if !output.status.success() {
            return Err(anyhow!("ping reported {host} unreachable"));
        }

        Ok(parse_ping_latency(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Extract the round-trip time from `time=12.3 ms` (or `time<1 ms`) output.
/// An unparseable reply still counts as reachable, just without a latency.
fn parse_ping_latency(output: &str) -> Option<u64> {
    let rest = &output[output.find("time")? + 4..];
    let rest = rest.strip_prefix(['=', '<'])?;
    let digits: String =
        rest.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
    digits.parse::<f64>().ok().map(|ms| ms.round() as u64)
}

/// Probes with an HTTPS GET against the bare host.
///
/// Useful where ICMP is filtered; 2xx and 3xx responses count as reachable.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, host: &str) -> Result<Option<u64>> {
        let started = Instant::now();

        let response = self
            .client
            .get(format!("https://{host}/"))
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {e}"))?;

        let latency_ms = started.elapsed().as_millis() as u64;
        if response.status().is_success() || response.status().is_redirection() {
            Ok(Some(latency_ms))
        } else {
            Err(anyhow!("HTTP check failed with status code: {}", response.status().as_u16()))
        }
    }
}

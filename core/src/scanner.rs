//! The concurrent, rate-limited **network scanner**.
//!
//! Every target spec is expanded into concrete hosts, which are handed to a
//! fixed pool of workers through a single admission gate. The gate releases at
//! most `rate_per_second` hosts per second regardless of pool size.
//!
//! **Cancellation:** the `shutdown` future stops admission. Probes that were
//! already handed to a worker still finish (or hit their own deadline), and
//! hosts that never got admitted are reported with an error. The output
//! always has one entry per expanded host.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use deployr_common::config::ScannerConfig;
use deployr_common::network::target::TargetSpec;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub mod probe;

pub use probe::{PortProbe, ProbeResult, Prober};

/// Extra time a worker grants a probe past its deadline before giving up on it.
const PROBE_GRACE: Duration = Duration::from_millis(250);

pub const CANCELED_BEFORE_PROBE: &str = "scan canceled before probe";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no targets to scan")]
    NoTargets,
}

/// One host's probe outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub host: String,
    /// The spec this host was expanded from, as the user typed it.
    pub source: String,
    pub reachable: bool,
    pub open_ports: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResult {
    fn probed(job: ScanJob, result: ProbeResult) -> Self {
        Self {
            host: job.host,
            source: job.source,
            reachable: result.reachable,
            open_ports: result.open_ports,
            error: None,
        }
    }

    fn failed(job: ScanJob, error: impl Into<String>) -> Self {
        Self {
            host: job.host,
            source: job.source,
            reachable: false,
            open_ports: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone)]
struct ScanJob {
    host: String,
    source: String,
}

/// Scans every host described by `specs` with the default TCP port probe.
pub async fn scan_targets<S>(
    specs: &[TargetSpec],
    config: ScannerConfig,
    shutdown: S,
) -> Result<Vec<ScanResult>, ScanError>
where
    S: Future<Output = ()>,
{
    let config = config.normalized();
    let probe = PortProbe::new(config.ports.clone(), config.timeout);
    scan_with_probe(specs, config, Arc::new(probe), shutdown).await
}

/// Scans every host described by `specs` using `probe`.
pub async fn scan_with_probe<S>(
    specs: &[TargetSpec],
    config: ScannerConfig,
    probe: Arc<dyn Prober>,
    shutdown: S,
) -> Result<Vec<ScanResult>, ScanError>
where
    S: Future<Output = ()>,
{
    if specs.is_empty() {
        return Err(ScanError::NoTargets);
    }

    let config = config.normalized();
    let mut jobs = expand_specs(specs);
    let total: u128 = specs.iter().map(|spec| spec.host_count()).sum();
    info!(
        "Scanning {total} host(s) with {} workers at {}/s",
        config.max_concurrency, config.rate_per_second
    );

    let (job_tx, job_rx) = mpsc::channel::<ScanJob>(1);
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<ScanResult>();
    let job_rx = Arc::new(Mutex::new(job_rx));

    let mut workers = JoinSet::new();
    for _ in 0..config.max_concurrency {
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        let probe = probe.clone();
        let probe_timeout = config.timeout;

        workers.spawn(async move {
            loop {
                // The guard is released before probing so other workers can pull jobs.
                let next = job_rx.lock().await.recv().await;
                let Some(job) = next else { break };
                let result = scan_host(job, probe.as_ref(), probe_timeout).await;
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });
    }

    let interrupted = admit(&mut jobs, job_tx, config.admission_interval(), shutdown).await;
    if let Some(job) = interrupted {
        let mut skipped = 0usize;
        for job in std::iter::once(job).chain(jobs) {
            skipped += 1;
            let _ = result_tx.send(ScanResult::failed(job, CANCELED_BEFORE_PROBE));
        }
        warn!("Scan canceled, {skipped} host(s) left unprobed");
    }
    drop(result_tx);

    let mut results = Vec::new();
    while let Some(result) = result_rx.recv().await {
        results.push(result);
    }
    while workers.join_next().await.is_some() {}

    let reachable = results.iter().filter(|r| r.reachable).count();
    info!("Scan finished: {reachable}/{total} host(s) reachable");
    Ok(results)
}

/// Feeds jobs to the pool at the configured pace, pulling them lazily.
///
/// Returns the job in hand when `shutdown` fired; the rest stay in `jobs`.
async fn admit<I, S>(
    jobs: &mut I,
    job_tx: mpsc::Sender<ScanJob>,
    interval: Duration,
    shutdown: S,
) -> Option<ScanJob>
where
    I: Iterator<Item = ScanJob>,
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    for job in jobs.by_ref() {
        let canceled = tokio::select! {
            biased;
            _ = &mut shutdown => true,
            _ = ticker.tick() => false,
        };

        let permit = if canceled {
            None
        } else {
            tokio::select! {
                biased;
                _ = &mut shutdown => None,
                permit = job_tx.reserve() => permit.ok(),
            }
        };

        match permit {
            Some(permit) => permit.send(job),
            None => return Some(job),
        }
    }

    None
}

async fn scan_host(job: ScanJob, probe: &dyn Prober, probe_timeout: Duration) -> ScanResult {
    let deadline = Instant::now() + probe_timeout;

    let outcome =
        tokio::time::timeout_at(deadline + PROBE_GRACE, probe.probe(&job.host, deadline)).await;

    match outcome {
        Ok(Ok(result)) => {
            debug!(host = %job.host, ports = ?result.open_ports, "probe finished");
            ScanResult::probed(job, result)
        }
        Ok(Err(e)) => {
            debug!(host = %job.host, "probe failed: {e:#}");
            ScanResult::failed(job, format!("{e:#}"))
        }
        Err(_elapsed) => ScanResult::failed(job, "probe exceeded its deadline"),
    }
}

fn expand_specs(specs: &[TargetSpec]) -> impl Iterator<Item = ScanJob> + '_ {
    specs.iter().flat_map(|spec| {
        spec.hosts().map(move |host| ScanJob {
            host,
            source: spec.original().to_string(),
        })
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use deployr_common::network::target::parse_inputs;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProbe;

    #[async_trait]
    impl Prober for FakeProbe {
        async fn probe(&self, host: &str, _deadline: Instant) -> anyhow::Result<ProbeResult> {
            if host == "10.0.0.2" {
                anyhow::bail!("probe exploded");
            }
            Ok(ProbeResult::from_open_ports(vec![22]))
        }
    }

    struct CountingProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Prober for CountingProbe {
        async fn probe(&self, _host: &str, _deadline: Instant) -> anyhow::Result<ProbeResult> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(ProbeResult::default())
        }
    }

    struct HangingProbe;

    #[async_trait]
    impl Prober for HangingProbe {
        async fn probe(&self, _host: &str, _deadline: Instant) -> anyhow::Result<ProbeResult> {
            std::future::pending().await
        }
    }

    fn fast_config() -> ScannerConfig {
        ScannerConfig {
            max_concurrency: 4,
            rate_per_second: 1_000,
            timeout: Duration::from_millis(200),
            ports: vec![22],
        }
    }

    #[tokio::test]
    async fn one_result_per_expanded_host() {
        let (specs, errors) = parse_inputs(&["127.0.0.1", "localhost", "10.0.0.0/30"]);
        assert!(errors.is_empty());

        let results = scan_with_probe(&specs, fast_config(), Arc::new(FakeProbe), std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(results.len(), 6);
        let hosts: HashSet<&str> = results.iter().map(|r| r.host.as_str()).collect();
        assert!(hosts.contains("localhost"));
        assert!(hosts.contains("10.0.0.3"));
    }

    #[tokio::test]
    async fn probe_errors_stay_on_their_host() {
        let (specs, _) = parse_inputs(&["10.0.0.0/30"]);
        let results = scan_with_probe(&specs, fast_config(), Arc::new(FakeProbe), std::future::pending::<()>())
            .await
            .unwrap();

        let failed: Vec<&ScanResult> = results.iter().filter(|r| r.error.is_some()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].host, "10.0.0.2");
        assert!(!failed[0].reachable);
        assert!(results.iter().all(|r| r.source == "10.0.0.0/30"));
        assert!(results.iter().all(|r| r.reachable == !r.open_ports.is_empty()));
    }

    #[tokio::test]
    async fn pool_never_exceeds_max_concurrency() {
        let (specs, _) = parse_inputs(&["10.1.0.0/28"]);
        let probe = Arc::new(CountingProbe {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let config = ScannerConfig {
            max_concurrency: 3,
            ..fast_config()
        };

        let results = scan_with_probe(&specs, config, probe.clone(), std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(results.len(), 16);
        assert!(probe.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn hanging_probe_resolves_through_its_deadline() {
        let (specs, _) = parse_inputs(&["10.0.0.9"]);
        let config = ScannerConfig {
            timeout: Duration::from_millis(50),
            ..fast_config()
        };

        let results = scan_with_probe(&specs, config, Arc::new(HangingProbe), std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].error.as_deref(), Some("probe exceeded its deadline"));
    }

    #[tokio::test]
    async fn cancellation_stops_admission_without_dropping_hosts() {
        let (specs, _) = parse_inputs(&["10.2.0.0/24"]);
        let config = ScannerConfig {
            rate_per_second: 10,
            ..fast_config()
        };
        let shutdown = tokio::time::sleep(Duration::from_millis(250));

        let results = scan_with_probe(&specs, config, Arc::new(FakeProbe), shutdown)
            .await
            .unwrap();

        assert_eq!(results.len(), 256);
        let canceled = results
            .iter()
            .filter(|r| r.error.as_deref() == Some(CANCELED_BEFORE_PROBE))
            .count();
        assert!(canceled > 200, "only {canceled} hosts were left unprobed");
    }

    #[tokio::test]
    async fn admission_pulls_hosts_lazily() {
        let mut endless = (0u32..).map(|i| ScanJob {
            host: format!("h{i}"),
            source: "endless".into(),
        });
        let (job_tx, mut job_rx) = mpsc::channel(1);
        let drain = tokio::spawn(async move {
            let mut admitted = 0u32;
            while job_rx.recv().await.is_some() {
                admitted += 1;
            }
            admitted
        });

        let interrupted = admit(
            &mut endless,
            job_tx,
            Duration::from_millis(1),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;
        let admitted = drain.await.unwrap();

        assert_eq!(interrupted.unwrap().host, format!("h{admitted}"));
        assert_eq!(endless.next().unwrap().host, format!("h{}", admitted + 1));
    }

    #[tokio::test]
    async fn empty_spec_list_is_rejected() {
        let result = scan_with_probe(&[], fast_config(), Arc::new(FakeProbe), std::future::pending::<()>()).await;
        assert!(matches!(result, Err(ScanError::NoTargets)));
    }
}

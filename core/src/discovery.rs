//! # Target Discovery Service
//!
//! Implements the "scan and fingerprint" use case.
//!
//! This service runs the network scan and turns every raw probe outcome into a
//! target record the external inventory can store: address split into IP or
//! hostname, OS guessed from the open management ports, and a readiness
//! assessment.

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use deployr_common::config::ScannerConfig;
use deployr_common::network::target::TargetSpec;
use deployr_common::os::TargetOs;
use serde::Serialize;

use crate::assessment::Assessment;
use crate::osdetect::detect_from_ports;
use crate::scanner::{PortProbe, Prober, ScanError, ScanResult, scan_with_probe};

/// A scanned host, ready to be stored as a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredTarget {
    pub ip: Option<IpAddr>,
    pub hostname: Option<String>,
    pub os: TargetOs,
    pub scan: ScanResult,
    pub assessment: Assessment,
}

impl DiscoveredTarget {
    pub fn from_scan(scan: ScanResult) -> Self {
        let (ip, hostname) = match scan.host.parse::<IpAddr>() {
            Ok(ip) => (Some(ip), None),
            Err(_) => (None, Some(scan.host.clone())),
        };
        Self {
            ip,
            hostname,
            os: detect_from_ports(&scan.open_ports),
            assessment: Assessment::from_scan(&scan),
            scan,
        }
    }

    pub fn label(&self) -> &str {
        &self.scan.host
    }
}

/// Application Service for target discovery.
///
/// Orchestrates the process by:
/// 1. delegating the probing to the [`Prober`] trait through the scanner.
/// 2. enriching the results with OS detection and an assessment.
pub struct DiscoveryService {
    prober: Arc<dyn Prober>,
    config: ScannerConfig,
}

impl DiscoveryService {
    /// Uses plain TCP connects on the configured ports.
    pub fn new(config: ScannerConfig) -> Self {
        let config = config.normalized();
        let prober = Arc::new(PortProbe::new(config.ports.clone(), config.timeout));
        Self { prober, config }
    }

    pub fn with_prober(config: ScannerConfig, prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scans `specs` and returns one target per expanded host, IPs first in
    /// numeric order, then hostnames.
    pub async fn perform_discovery<S>(
        &self,
        specs: &[TargetSpec],
        shutdown: S,
    ) -> Result<Vec<DiscoveredTarget>, ScanError>
    where
        S: Future<Output = ()>,
    {
        let results =
            scan_with_probe(specs, self.config.clone(), self.prober.clone(), shutdown).await?;

        let mut targets: Vec<DiscoveredTarget> =
            results.into_iter().map(DiscoveredTarget::from_scan).collect();
        targets.sort_by(|a, b| {
            (a.ip.is_none(), a.ip, &a.hostname).cmp(&(b.ip.is_none(), b.ip, &b.hostname))
        });

        Ok(targets)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

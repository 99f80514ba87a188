use std::collections::HashSet;
use std::time::Duration;

use deployr_common::config::ScannerConfig;
use deployr_common::network::target::{TargetError, TargetKind, parse_inputs};
use deployr_common::os::TargetOs;
use deployr_core::discovery::DiscoveryService;
use deployr_core::scanner::scan_targets;
use tokio::net::TcpListener;

/// This test verifies that a real TCP listener on loopback is seen as an open
/// port and that the host is fingerprinted from it.
#[tokio::test]
async fn discovery_single_loopback() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (specs, errors) = parse_inputs(&["127.0.0.1"]);
    assert!(errors.is_empty());

    let config = ScannerConfig::default()
        .with_ports(vec![port])
        .with_timeout(Duration::from_secs(1));
    let service = DiscoveryService::new(config);

    let targets = service
        .perform_discovery(&specs, std::future::pending::<()>())
        .await
        .expect("Discovery failed");

    assert_eq!(targets.len(), 1);
    let target = &targets[0];
    assert_eq!(target.ip, Some("127.0.0.1".parse().unwrap()));
    assert!(target.scan.reachable);
    assert_eq!(target.scan.open_ports, vec![port]);
    // A non-management port says nothing about the OS.
    assert_eq!(target.os, TargetOs::Unknown);
    assert_eq!(target.assessment.predicted_success, 40);
}

#[tokio::test]
async fn mixed_inputs_keep_valid_specs_and_report_the_rest() {
    let values = ["10.0.0.5", "not a valid hostname!!", "10.0.0.0/30"];
    let (specs, errors) = parse_inputs(&values);

    assert_eq!(
        specs.iter().map(|s| s.kind()).collect::<Vec<_>>(),
        vec![TargetKind::Ip, TargetKind::Cidr]
    );
    assert_eq!(
        errors,
        vec![TargetError::Invalid("not a valid hostname!!".into())]
    );
    assert_eq!(specs[1].hosts().count(), 4);
}

#[tokio::test]
async fn every_expanded_host_gets_a_result() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (specs, _) = parse_inputs(&["127.0.0.0/30", "127.0.0.1"]);
    let config = ScannerConfig {
        max_concurrency: 2,
        rate_per_second: 100,
        timeout: Duration::from_millis(500),
        ports: vec![port],
    };

    let results = scan_targets(&specs, config, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    let sources: HashSet<&str> = results.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(sources, HashSet::from(["127.0.0.0/30", "127.0.0.1"]));

    for result in &results {
        assert_eq!(result.reachable, !result.open_ports.is_empty());
    }
    let loopback_hits = results
        .iter()
        .filter(|r| r.host == "127.0.0.1" && r.reachable)
        .count();
    assert_eq!(loopback_hits, 2);
}

#[tokio::test]
async fn cancellation_before_start_reports_every_host() {
    let (specs, _) = parse_inputs(&["192.0.2.0/29"]);
    let config = ScannerConfig {
        rate_per_second: 1,
        ..ScannerConfig::default()
    };

    let results = scan_targets(&specs, config, std::future::ready(()))
        .await
        .unwrap();

    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|r| !r.reachable && r.error.is_some()));
}

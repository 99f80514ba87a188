use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{Instrument, info_span, warn};

use crate::commands::ScanArgs;
use crate::mprint;
use crate::terminal::{colors, format, print, spinner};
use deployr_common::config::Config;
use deployr_common::network::target::parse_inputs;
use deployr_common::success;
use deployr_core::discovery::{DiscoveredTarget, DiscoveryService};

pub async fn scan(args: ScanArgs, cfg: &Config) -> anyhow::Result<()> {
    let (specs, errors) = parse_inputs(&args.values);
    for error in &errors {
        warn!("Skipping target: {error}");
    }
    if specs.is_empty() {
        anyhow::bail!("no valid targets to scan");
    }

    let host_count: u128 = specs.iter().map(|spec| spec.host_count()).sum();
    let service = DiscoveryService::new(args.scanner_config());

    let span = info_span!("scan", indicatif.pb_show = true);
    let running: Arc<AtomicBool> = Arc::new(AtomicBool::new(true));
    let spinner_handle = spinner::start_scan_spinner(span.clone(), host_count, running.clone());

    let start_time: Instant = Instant::now();
    let outcome = service
        .perform_discovery(&specs, shutdown_signal())
        .instrument(span)
        .await;

    running.store(false, Ordering::Relaxed);
    let _ = spinner_handle.join();

    let targets = outcome.context("scan failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    scan_ends(&targets, start_time.elapsed(), cfg);
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    warn!("Interrupted, finishing probes already in flight");
}

fn scan_ends(targets: &[DiscoveredTarget], total_time: Duration, cfg: &Config) {
    if targets.is_empty() {
        print::header("ZERO HOSTS SCANNED", cfg.quiet);
        print::no_results();
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("scan results", cfg.quiet);
    if cfg.quiet < 2 {
        print_targets(targets);
    }

    let reachable = targets.iter().filter(|t| t.scan.reachable).count();
    print_summary(reachable, targets.len(), total_time, cfg);
}

fn print_targets(targets: &[DiscoveredTarget]) {
    for (idx, target) in targets.iter().enumerate() {
        print::tree_head(idx, target.label());
        print::as_tree_one_level(format::target_details(target));
        if idx + 1 != targets.len() {
            mprint!();
        }
    }
}

fn print_summary(reachable: usize, total: usize, total_time: Duration, cfg: &Config) {
    let reachable: ColoredString = format!("{reachable}/{total} hosts").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString = format!("Scan Complete: {reachable} reachable in {total_time}")
        .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}

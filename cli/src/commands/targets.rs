use colored::*;
use tracing::warn;

use crate::terminal::{colors, print};
use deployr_common::config::Config;
use deployr_common::network::target::{TargetKind, parse_inputs};
use deployr_common::success;

pub fn targets(values: &[String], cfg: &Config) -> anyhow::Result<()> {
    let (specs, errors) = parse_inputs(values);

    print::header("target specifications", cfg.quiet);
    for (idx, spec) in specs.iter().enumerate() {
        let kind = match spec.kind() {
            TargetKind::Hostname => "hostname",
            TargetKind::Ip => "ip",
            TargetKind::Cidr => "cidr",
        };
        print::tree_head(idx, spec.original());
        print::as_tree_one_level(vec![
            ("Kind".to_string(), kind.color(colors::TEXT_DEFAULT)),
            ("Parsed".to_string(), spec.to_string().color(colors::PRIMARY)),
            ("Hosts".to_string(), spec.host_count().to_string().color(colors::ACCENT)),
        ]);
    }

    for error in &errors {
        warn!("{error}");
    }

    if specs.is_empty() {
        anyhow::bail!("no valid targets");
    }

    let total: u128 = specs.iter().map(|spec| spec.host_count()).sum();
    success!("{} target(s) expand to {total} host(s)", specs.len());
    Ok(())
}

pub mod explain;
pub mod plan;
pub mod scan;
pub mod targets;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use deployr_common::config::ScannerConfig;
use deployr_common::error::ErrorCode;
use deployr_common::os::TargetOs;
use deployr_core::plan::{InstallRequest, PackageType};

#[derive(Parser)]
#[command(name = "deployr")]
#[command(about = "Find SSH/WinRM hosts and plan agent deployments.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Output level: 0 prints everything, 1 drops headers, 2 only summaries
    #[arg(short, long, global = true, default_value_t = 0, env = "DEPLOYR_QUIET",
          value_parser = clap::value_parser!(u8).range(0..=2))]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse target values and show what they expand to
    #[command(alias = "t")]
    Targets {
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Probe hosts for SSH/WinRM and assess deployment readiness
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Print the commands a deployment would run on a target
    #[command(alias = "p")]
    Plan(PlanArgs),
    /// Show remediation steps for an error code
    #[command(alias = "e")]
    Explain { code: ErrorCode },
}

#[derive(Args)]
pub struct ScanArgs {
    /// Hostnames, IP addresses or CIDR blocks
    #[arg(required = true)]
    pub values: Vec<String>,

    /// 1 (gentle) to 5 (fast); unset keeps the default pool and rate
    #[arg(short, long, env = "DEPLOYR_AGGRESSIVENESS",
          value_parser = clap::value_parser!(u8).range(1..=5))]
    pub aggressiveness: Option<u8>,

    /// Comma-separated ports to probe
    #[arg(short, long, env = "DEPLOYR_PORTS", value_delimiter = ',')]
    pub ports: Vec<u16>,

    /// Per-host probe timeout in milliseconds
    #[arg(long, env = "DEPLOYR_SCAN_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Print results as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub fn scanner_config(&self) -> ScannerConfig {
        let mut config = match self.aggressiveness {
            Some(level) => ScannerConfig::from_aggressiveness(level),
            None => ScannerConfig::default(),
        };
        if !self.ports.is_empty() {
            config = config.with_ports(self.ports.clone());
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        config.normalized()
    }
}

#[derive(Args)]
pub struct PlanArgs {
    /// Target OS: windows, linux or macos
    #[arg(long)]
    pub os: TargetOs,

    /// Where the target downloads the payload from
    #[arg(long)]
    pub url: String,

    /// Destination path on the target
    #[arg(long)]
    pub dest: Option<String>,

    /// binary, msi, exe, pkg, deb or rpm (inferred from the URL when unset)
    #[arg(long = "package")]
    pub package_type: Option<PackageType>,

    /// Run the payload after installing it
    #[arg(long)]
    pub execute: bool,

    /// Argument for the executed payload (repeatable)
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Expected SHA-256 of the payload
    #[arg(long)]
    pub checksum: Option<String>,

    #[arg(long)]
    pub checksum_alg: Option<String>,

    /// Expected CPU architecture, e.g. amd64 or arm64
    #[arg(long)]
    pub arch: Option<String>,

    /// Minimum free disk space in MB
    #[arg(long, default_value_t = 0)]
    pub min_free_mb: u64,

    #[arg(long)]
    pub proxy: Option<String>,

    /// The payload needs a reboot to finish installing
    #[arg(long)]
    pub reboot: bool,

    /// Permit the plan to reboot the target
    #[arg(long)]
    pub allow_reboot: bool,

    /// Print the plan as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn to_request(&self) -> InstallRequest {
        InstallRequest {
            os: self.os,
            binary_url: self.url.clone(),
            destination_path: self.dest.clone().unwrap_or_default(),
            package_type: self.package_type,
            post_install_args: self.args.clone(),
            execute_on_install: self.execute,
            checksum: self.checksum.clone(),
            checksum_alg: self.checksum_alg.clone(),
            expected_arch: self.arch.clone(),
            min_free_mb: self.min_free_mb,
            proxy_url: self.proxy.clone(),
            requires_reboot: self.reboot,
            allow_reboot: self.allow_reboot,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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

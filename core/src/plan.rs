//! # Deployment Plan Builder
//!
//! Turns an [`InstallRequest`] into the flat list of shell commands a runner
//! executes on the target. All branching happens here; the remote side only
//! ever sees a linear script.
//!
//! Building is pure: the same request always yields the same commands.

pub mod posix;
pub mod powershell;
pub mod request;
pub mod step;

use deployr_common::os::TargetOs;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub use request::{InstallRequest, PackageType, UnknownPackageType};
pub use step::Step;

pub const DEFAULT_WINDOWS_DESTINATION: &str = r"C:\DeployrAgent\installer.bin";
pub const DEFAULT_UNIX_DESTINATION: &str = "/tmp/DeployrAgent/installer.bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMethod {
    CurlDownload,
    PowershellDownload,
}

impl InstallMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallMethod::CurlDownload => "curl_download",
            InstallMethod::PowershellDownload => "powershell_download",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("binary url is required")]
    MissingUrl,

    #[error("invalid binary url: {0}")]
    InvalidUrl(String),

    #[error("binary url must include a host")]
    UrlWithoutHost,

    #[error("package type {package} is not compatible with os {os}")]
    IncompatiblePackage { package: PackageType, os: TargetOs },

    #[error("unsupported os: {0}")]
    UnsupportedOs(TargetOs),

    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedChecksumAlgorithm(String),

    #[error("checksum must be 64 hexadecimal characters")]
    InvalidChecksum,
}

/// A validated, rendered deployment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployPlan {
    pub method: InstallMethod,
    pub package_type: PackageType,
    pub destination_path: String,
    steps: Vec<Step>,
    commands: Vec<String>,
}

impl DeployPlan {
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Collapses spellings of the same architecture: `x86_64` and `amd64` are
/// both `amd64`, everything else is lowercased.
pub fn normalize_arch(arch: &str) -> String {
    match arch.trim().to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" => "amd64".to_string(),
        other => other.to_string(),
    }
}

/// Splits a destination into `(directory, file)` on the last `/` or `\`.
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

pub fn default_destination(os: TargetOs) -> &'static str {
    match os {
        TargetOs::Windows => DEFAULT_WINDOWS_DESTINATION,
        _ => DEFAULT_UNIX_DESTINATION,
    }
}

pub fn build_plan(request: &InstallRequest) -> Result<DeployPlan, PlanError> {
    let url = validate_url(&request.binary_url)?;

    let destination = match request.destination_path.trim() {
        "" => default_destination(request.os),
        path => path,
    };

    let package = request
        .package_type
        .unwrap_or_else(|| PackageType::from_url(url));
    if !package.is_allowed_on(request.os) {
        return Err(PlanError::IncompatiblePackage {
            package,
            os: request.os,
        });
    }

    let method = match request.os {
        TargetOs::Windows => InstallMethod::PowershellDownload,
        TargetOs::Linux | TargetOs::MacOs => InstallMethod::CurlDownload,
        TargetOs::Unknown => return Err(PlanError::UnsupportedOs(request.os)),
    };

    let checksum = validate_checksum(request)?;
    let steps = assemble(request, url, destination, package, checksum);
    let commands = steps
        .iter()
        .map(|step| match method {
            InstallMethod::CurlDownload => posix::render(step, request.os),
            InstallMethod::PowershellDownload => powershell::render(step),
        })
        .collect::<Vec<_>>();

    debug!(
        os = %request.os,
        package = %package,
        commands = commands.len(),
        "Built deployment plan"
    );

    Ok(DeployPlan {
        method,
        package_type: package,
        destination_path: destination.to_string(),
        steps,
        commands,
    })
}

fn validate_url(raw: &str) -> Result<&str, PlanError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(PlanError::MissingUrl);
    }
    let parsed = Url::parse(url).map_err(|e| PlanError::InvalidUrl(format!("{url} ({e})")))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(PlanError::UrlWithoutHost),
    }
}

/// Returns the lowercase digest to verify, if any.
fn validate_checksum(request: &InstallRequest) -> Result<Option<String>, PlanError> {
    if let Some(alg) = request.checksum_alg() {
        let alg = alg.to_ascii_lowercase();
        if alg != "sha256" && alg != "sha-256" {
            return Err(PlanError::UnsupportedChecksumAlgorithm(alg));
        }
    }

    let Some(sum) = request.checksum() else {
        return Ok(None);
    };
    if sum.len() != 64 || !sum.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PlanError::InvalidChecksum);
    }
    Ok(Some(sum.to_ascii_lowercase()))
}

fn assemble(
    request: &InstallRequest,
    url: &str,
    destination: &str,
    package: PackageType,
    checksum: Option<String>,
) -> Vec<Step> {
    let (folder, _) = split_path(destination);
    let folder = folder.to_string();
    let file = destination.to_string();
    let windows = request.os == TargetOs::Windows;

    let mut steps = Vec::new();

    if windows {
        steps.push(Step::CreateDirectory { path: folder.clone() });
    } else {
        steps.push(Step::FailFast);
    }

    if request.min_free_mb > 0 {
        steps.push(Step::CheckDiskSpace {
            path: folder.clone(),
            min_free_mb: request.min_free_mb,
        });
    }

    if let Some(arch) = request.expected_arch() {
        steps.push(Step::CheckArch {
            expected: normalize_arch(arch),
        });
    }

    if !windows {
        steps.push(Step::CreateDirectory { path: folder.clone() });
    }

    steps.push(Step::Download {
        url: url.to_string(),
        path: file.clone(),
        proxy: request.proxy_url().map(str::to_string),
    });
    steps.push(Step::MarkRunnable { path: file.clone() });

    if let Some(sha256) = checksum {
        steps.push(Step::VerifyChecksum {
            path: file.clone(),
            sha256,
        });
    }

    let installed = package.has_installer();
    if installed {
        steps.push(Step::Install {
            package,
            path: file.clone(),
        });
    }

    if request.execute_on_install {
        steps.push(Step::Run {
            path: file.clone(),
            args: request.post_install_args.clone(),
        });
    }

    if installed || request.execute_on_install {
        if request.reboot_permitted() {
            steps.push(Step::Reboot);
        }
        steps.push(Step::RemoveFile { path: file });
        steps.push(Step::RemoveDirectory { path: folder });
    }

    steps
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

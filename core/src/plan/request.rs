use std::fmt;
use std::str::FromStr;

use deployr_common::os::TargetOs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    /// A bare executable; downloading it is the whole install.
    Binary,
    Msi,
    Exe,
    Pkg,
    Deb,
    Rpm,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Binary => "binary",
            PackageType::Msi => "msi",
            PackageType::Exe => "exe",
            PackageType::Pkg => "pkg",
            PackageType::Deb => "deb",
            PackageType::Rpm => "rpm",
        }
    }

    /// Infers the package type from the URL's file suffix (case-insensitive).
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        [
            (".msi", PackageType::Msi),
            (".exe", PackageType::Exe),
            (".pkg", PackageType::Pkg),
            (".deb", PackageType::Deb),
            (".rpm", PackageType::Rpm),
        ]
        .into_iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map_or(PackageType::Binary, |(_, package)| package)
    }

    /// Whether this package can be installed on `os`. Binaries go anywhere.
    pub fn is_allowed_on(&self, os: TargetOs) -> bool {
        match self {
            PackageType::Binary => true,
            PackageType::Msi | PackageType::Exe => os == TargetOs::Windows,
            PackageType::Pkg => os == TargetOs::MacOs,
            PackageType::Deb | PackageType::Rpm => os == TargetOs::Linux,
        }
    }

    /// Whether the package has an install step beyond the download.
    pub fn has_installer(&self) -> bool {
        *self != PackageType::Binary
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown package type: {0}")]
pub struct UnknownPackageType(pub String);

impl FromStr for PackageType {
    type Err = UnknownPackageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(PackageType::Binary),
            "msi" => Ok(PackageType::Msi),
            "exe" => Ok(PackageType::Exe),
            "pkg" => Ok(PackageType::Pkg),
            "deb" => Ok(PackageType::Deb),
            "rpm" => Ok(PackageType::Rpm),
            _ => Err(UnknownPackageType(s.to_string())),
        }
    }
}

/// The deployment intent for one target.
///
/// Empty strings and `None` are treated alike for optional text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallRequest {
    pub os: TargetOs,
    pub binary_url: String,
    /// Falls back to a per-OS default when empty.
    pub destination_path: String,
    /// Inferred from the URL suffix when unset.
    pub package_type: Option<PackageType>,
    pub post_install_args: Vec<String>,
    pub execute_on_install: bool,
    pub checksum: Option<String>,
    pub checksum_alg: Option<String>,
    pub expected_arch: Option<String>,
    pub min_free_mb: u64,
    pub proxy_url: Option<String>,
    pub requires_reboot: bool,
    pub allow_reboot: bool,
}

impl InstallRequest {
    pub fn new(os: TargetOs, binary_url: impl Into<String>) -> Self {
        Self {
            os,
            binary_url: binary_url.into(),
            ..Self::default()
        }
    }

    pub fn checksum(&self) -> Option<&str> {
        non_empty(&self.checksum)
    }

    pub fn checksum_alg(&self) -> Option<&str> {
        non_empty(&self.checksum_alg)
    }

    pub fn expected_arch(&self) -> Option<&str> {
        non_empty(&self.expected_arch)
    }

    pub fn proxy_url(&self) -> Option<&str> {
        non_empty(&self.proxy_url)
    }

    pub fn reboot_permitted(&self) -> bool {
        self.requires_reboot && self.allow_reboot
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

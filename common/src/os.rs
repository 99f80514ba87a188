//! Operating system vocabulary shared by the scanner, planner and engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The operating system family of a target host.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetOs {
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOs,
    #[default]
    Unknown,
}

impl TargetOs {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Windows => "windows",
            TargetOs::Linux => "linux",
            TargetOs::MacOs => "macos",
            TargetOs::Unknown => "unknown",
        }
    }

    /// Linux and macOS share the POSIX shell plan and SSH access.
    pub fn is_unix_like(&self) -> bool {
        matches!(self, TargetOs::Linux | TargetOs::MacOs)
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = std::convert::Infallible;

    /// Anything unrecognised is `Unknown`; an unknown OS is a valid answer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "windows" => TargetOs::Windows,
            "linux" => TargetOs::Linux,
            "macos" => TargetOs::MacOs,
            _ => TargetOs::Unknown,
        })
    }
}

/// OS family an uploaded installer was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsFamily {
    Any,
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOs,
}

impl OsFamily {
    /// `Any` matches every known OS; an unknown target matches nothing specific.
    pub fn matches(&self, os: TargetOs) -> bool {
        match self {
            OsFamily::Any => true,
            OsFamily::Windows => os == TargetOs::Windows,
            OsFamily::Linux => os == TargetOs::Linux,
            OsFamily::MacOs => os == TargetOs::MacOs,
        }
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

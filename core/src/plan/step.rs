//! Typed plan steps.
//!
//! The planner decides *which* steps run and in what order; the shell modules
//! only decide how a step is spelled. Rendering happens once, at build time.

use serde::Serialize;

use super::request::PackageType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    FailFast,
    CreateDirectory { path: String },
    CheckDiskSpace { path: String, min_free_mb: u64 },
    /// `expected` is already normalized.
    CheckArch { expected: String },
    Download { url: String, path: String, proxy: Option<String> },
    /// `chmod +x` on Unix, `Unblock-File` on Windows.
    MarkRunnable { path: String },
    /// `sha256` is lowercase hex.
    VerifyChecksum { path: String, sha256: String },
    Install { package: PackageType, path: String },
    Run { path: String, args: Vec<String> },
    Reboot,
    RemoveFile { path: String },
    /// Best-effort; never fails the plan.
    RemoveDirectory { path: String },
}

/// Failure tokens a plan prints or throws so callers can grep the output.
pub mod token {
    pub const INSUFFICIENT_DISK: &str = "insufficient_disk";
    pub const ARCH_MISMATCH: &str = "arch_mismatch";
    pub const CHECKSUM_MISMATCH: &str = "checksum_mismatch";
    pub const UNSUPPORTED_PACKAGE: &str = "unsupported_package";
}

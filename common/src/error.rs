//! # Failure Taxonomy
//!
//! The closed set of codes a deployment failure can be reported under.
//! Each code carries fixed, context-free remediation guidance. The guidance is
//! advisory output only; nothing branches on it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    AuthDenied,
    AuthTimeout,
    PortClosed,
    UnsupportedOs,
    InstallFailed,
    NetworkIssue,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::AuthDenied,
        ErrorCode::AuthTimeout,
        ErrorCode::PortClosed,
        ErrorCode::UnsupportedOs,
        ErrorCode::InstallFailed,
        ErrorCode::NetworkIssue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthDenied => "auth_denied",
            ErrorCode::AuthTimeout => "auth_timeout",
            ErrorCode::PortClosed => "port_closed",
            ErrorCode::UnsupportedOs => "unsupported_os",
            ErrorCode::InstallFailed => "install_failed",
            ErrorCode::NetworkIssue => "network_issue",
        }
    }

    pub fn remediation_steps(&self) -> [&'static str; 3] {
        match self {
            ErrorCode::AuthDenied => [
                "Verify the account or key has access on the target.",
                "Check the target's auth policy (sudoers, local admin group, WinRM auth).",
                "Retry with key-based auth first, then password if needed.",
            ],
            ErrorCode::AuthTimeout => [
                "Confirm the management port is reachable from the controller.",
                "Validate firewall rules and security groups.",
                "Retry after confirming DNS/IP routing.",
            ],
            ErrorCode::PortClosed => [
                "Enable SSH (22) or WinRM HTTPS (5986) on the target.",
                "Restrict access to the controller subnet.",
                "Re-run the assessment scan.",
            ],
            ErrorCode::UnsupportedOs => [
                "Confirm the OS family is supported.",
                "Ensure the correct management service is installed.",
                "Re-scan to fingerprint the OS.",
            ],
            ErrorCode::InstallFailed => [
                "Validate the binary URL is reachable from the target.",
                "Confirm write/execute permissions on the destination path.",
                "Re-run with verbose logging to capture command output.",
            ],
            ErrorCode::NetworkIssue => [
                "Verify target connectivity (ping, DNS lookup).",
                "Confirm routing and VLAN rules.",
                "Re-run scan with a lower aggressiveness setting.",
            ],
        }
    }

    /// Remediation steps as a single numbered line: `1) ... 2) ... 3) ...`.
    pub fn remediation(&self) -> String {
        self.remediation_steps()
            .iter()
            .enumerate()
            .map(|(idx, step)| format!("{}) {step}", idx + 1))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s.trim())
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

/// What crosses from a failed execution into persisted state and policy decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    pub remediation: String,
}

impl ErrorDetail {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            remediation: code.remediation(),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
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

//! Readiness assessment: how likely a deployment is to succeed on a host,
//! and which secure channel to use for it.

use deployr_common::os::TargetOs;
use serde::Serialize;

use crate::osdetect::{SSH_PORT, WINRM_HTTP_PORT, WINRM_HTTPS_PORT, detect_from_ports};
use crate::scanner::ScanResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub os: TargetOs,
    /// `None` when the host was never probed successfully.
    pub reachable: Option<bool>,
    pub open_ports: Vec<u16>,
    pub predicted_success: u8,
    pub secure_method: &'static str,
    pub guidelines: [&'static str; 3],
}

impl Assessment {
    pub fn new(os: TargetOs, reachable: Option<bool>, open_ports: &[u16]) -> Self {
        let (secure_method, guidelines) = secure_guidelines(os, reachable, open_ports);
        Self {
            os,
            reachable,
            open_ports: open_ports.to_vec(),
            predicted_success: predict_success(os, reachable, open_ports),
            secure_method,
            guidelines,
        }
    }

    /// A probe error leaves reachability unknown.
    pub fn from_scan(result: &ScanResult) -> Self {
        let reachable = result.error.is_none().then_some(result.reachable);
        Self::new(detect_from_ports(&result.open_ports), reachable, &result.open_ports)
    }
}

pub fn predict_success(os: TargetOs, reachable: Option<bool>, open_ports: &[u16]) -> u8 {
    let has = |port| open_ports.contains(&port);
    match (reachable, os) {
        (None, _) => 0,
        (Some(false), _) => 5,
        (Some(true), TargetOs::Windows) if has(WINRM_HTTPS_PORT) => 90,
        (Some(true), TargetOs::Windows) if has(WINRM_HTTP_PORT) => 70,
        (Some(true), TargetOs::Linux | TargetOs::MacOs) if has(SSH_PORT) => 88,
        _ => 40,
    }
}

pub fn secure_guidelines(
    os: TargetOs,
    reachable: Option<bool>,
    open_ports: &[u16],
) -> (&'static str, [&'static str; 3]) {
    let has = |port| open_ports.contains(&port);

    if reachable != Some(true) {
        return (
            "No secure channel detected",
            [
                "Verify the host is powered on and reachable from the controller.",
                "Check firewall rules and routing from the controller subnet.",
                "Re-run the assessment scan after connectivity is confirmed.",
            ],
        );
    }

    match os {
        TargetOs::Windows if has(WINRM_HTTPS_PORT) => (
            "WinRM HTTPS (certificate)",
            [
                "Use WinRM HTTPS on port 5986 with certificate authentication.",
                "Confirm the certificate chain is trusted by the controller.",
                "Restrict WinRM to the controller subnet only.",
            ],
        ),
        TargetOs::Windows if has(WINRM_HTTP_PORT) => (
            "WinRM HTTPS (user/password)",
            [
                "Enable WinRM HTTPS and use strong, rotated credentials.",
                "Transition to certificate authentication for stronger assurance.",
                "Restrict WinRM to the controller subnet only.",
            ],
        ),
        TargetOs::Windows => (
            "Windows management port missing",
            [
                "Enable WinRM HTTPS and allow it through the firewall.",
                "Restrict access to the controller subnet.",
                "Validate Windows OpenSSH if WinRM cannot be enabled.",
            ],
        ),
        TargetOs::Linux | TargetOs::MacOs if has(SSH_PORT) => (
            "SSH key authentication",
            [
                "Use SSH keys with agent forwarding disabled.",
                "Limit SSH access to the controller subnet.",
                "Disable password auth after validating keys.",
            ],
        ),
        TargetOs::Linux | TargetOs::MacOs => (
            "SSH not detected",
            [
                "Enable SSH on port 22 and restrict access.",
                "Confirm host firewall allows the controller subnet.",
                "Re-run the assessment scan after enabling SSH.",
            ],
        ),
        TargetOs::Unknown => (
            "OS not identified",
            [
                "Run a fresh scan to fingerprint the operating system.",
                "Confirm management ports are open and reachable.",
                "Validate DNS and IP routing from the controller.",
            ],
        ),
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

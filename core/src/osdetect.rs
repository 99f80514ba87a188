use deployr_common::os::TargetOs;

pub const SSH_PORT: u16 = 22;
pub const WINRM_HTTP_PORT: u16 = 5985;
pub const WINRM_HTTPS_PORT: u16 = 5986;

/// Guesses the OS family from the management ports a host exposes.
///
/// WinRM ports take precedence over SSH.
pub fn detect_from_ports(open_ports: &[u16]) -> TargetOs {
    if open_ports.contains(&WINRM_HTTPS_PORT) || open_ports.contains(&WINRM_HTTP_PORT) {
        return TargetOs::Windows;
    }
    if open_ports.contains(&SSH_PORT) {
        return TargetOs::Linux;
    }
    TargetOs::Unknown
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

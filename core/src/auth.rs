//! Authentication method ordering and fallback selection.

use std::fmt;

use deployr_common::error::ErrorCode;
use deployr_common::os::TargetOs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    SshKey,
    SshPassword,
    WinrmHttpsCert,
    #[serde(rename = "winrm_https_userpass")]
    WinrmHttpsUserPass,
}

/// The transport an auth method rides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Ssh,
    WinRm,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::SshKey => "ssh_key",
            AuthMethod::SshPassword => "ssh_password",
            AuthMethod::WinrmHttpsCert => "winrm_https_cert",
            AuthMethod::WinrmHttpsUserPass => "winrm_https_userpass",
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            AuthMethod::SshKey | AuthMethod::SshPassword => Protocol::Ssh,
            AuthMethod::WinrmHttpsCert | AuthMethod::WinrmHttpsUserPass => Protocol::WinRm,
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One try of one auth method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub method: AuthMethod,
    pub error_code: Option<ErrorCode>,
}

/// Auth methods to try for `os`, strongest first. Empty means unsupported.
pub fn order_for_os(os: TargetOs) -> &'static [AuthMethod] {
    match os {
        TargetOs::Windows => &[AuthMethod::WinrmHttpsCert, AuthMethod::WinrmHttpsUserPass],
        TargetOs::Linux | TargetOs::MacOs => &[AuthMethod::SshKey, AuthMethod::SshPassword],
        TargetOs::Unknown => &[],
    }
}

/// First method in `order` that no attempt has used yet.
pub fn next_method(order: &[AuthMethod], attempts: &[Attempt]) -> Option<AuthMethod> {
    order
        .iter()
        .copied()
        .find(|method| !attempts.iter().any(|a| a.method == *method))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

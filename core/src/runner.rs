//! # Command Runner Capability
//!
//! The engine never speaks SSH or WinRM itself. It hands an ordered command
//! list to a runner and gets back what each command printed and returned.
//!
//! Contract for implementers:
//! * commands run strictly in order, one at a time;
//! * execution stops at the first command that fails, and the partial
//!   [`RunReport`] travels inside the returned [`RunError`];
//! * every call opens and tears down its own connection.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// What one remote command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub host: String,
    pub results: Vec<CommandResult>,
    pub duration_seconds: u64,
}

impl RunReport {
    pub fn has_non_zero_exit(&self) -> bool {
        self.results.iter().any(|r| r.exit_code != 0)
    }

    /// The command execution stopped at, if any.
    pub fn failed_command(&self) -> Option<&CommandResult> {
        self.results.iter().find(|r| r.exit_code != 0)
    }
}

/// A failed run, with everything that executed before the failure.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RunError {
    pub message: String,
    pub report: RunReport,
}

impl RunError {
    pub fn new(message: impl Into<String>, report: RunReport) -> Self {
        Self {
            message: message.into(),
            report,
        }
    }

    /// A failure that happened before any command ran (connect, handshake, auth).
    pub fn before_execution(host: &str, message: impl Into<String>) -> Self {
        Self::new(
            message,
            RunReport {
                host: host.to_string(),
                ..RunReport::default()
            },
        )
    }
}

/// SSH login material. A present key is offered before the password.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SshCredentials {
    pub username: String,
    pub password: Option<String>,
    pub private_key: Option<String>,
}

impl SshCredentials {
    pub fn is_usable(&self) -> bool {
        !self.username.is_empty() && (self.password.is_some() || self.private_key.is_some())
    }

    /// Keeps only the private key.
    pub fn key_only(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: None,
            private_key: self.private_key.clone(),
        }
    }

    /// Keeps only the password.
    pub fn password_only(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: self.password.clone(),
            private_key: None,
        }
    }
}

impl std::fmt::Debug for SshCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// WinRM login material. Username and password are both required.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct WinRmCredentials {
    pub username: String,
    pub password: String,
    pub use_https: bool,
    /// 0 picks the protocol default (5986 for HTTPS, 5985 for HTTP).
    pub port: u16,
    pub skip_tls_verify: bool,
}

impl WinRmCredentials {
    pub fn is_usable(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn effective_port(&self) -> u16 {
        match (self.port, self.use_https) {
            (0, true) => 5986,
            (0, false) => 5985,
            (port, _) => port,
        }
    }
}

impl std::fmt::Debug for WinRmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinRmCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("use_https", &self.use_https)
            .field("port", &self.port)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .finish()
    }
}

/// Everything the engine may authenticate with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    pub ssh: SshCredentials,
    pub winrm: WinRmCredentials,
}

#[async_trait]
pub trait SshRunner: Send + Sync {
    async fn run_ssh(
        &self,
        host: &str,
        commands: &[String],
        credentials: &SshCredentials,
    ) -> Result<RunReport, RunError>;
}

#[async_trait]
pub trait WinRmRunner: Send + Sync {
    async fn run_winrm(
        &self,
        host: &str,
        commands: &[String],
        credentials: &WinRmCredentials,
    ) -> Result<RunReport, RunError>;
}

/// Runs command lists over either protocol family.
pub trait CommandRunner: SshRunner + WinRmRunner {}

impl<T: SshRunner + WinRmRunner> CommandRunner for T {}

/// Routes each call to the runner for its protocol.
pub struct MultiRunner {
    ssh: Box<dyn SshRunner>,
    winrm: Box<dyn WinRmRunner>,
}

impl MultiRunner {
    pub fn new(ssh: Box<dyn SshRunner>, winrm: Box<dyn WinRmRunner>) -> Self {
        Self { ssh, winrm }
    }
}

#[async_trait]
impl SshRunner for MultiRunner {
    async fn run_ssh(
        &self,
        host: &str,
        commands: &[String],
        credentials: &SshCredentials,
    ) -> Result<RunReport, RunError> {
        self.ssh.run_ssh(host, commands, credentials).await
    }
}

#[async_trait]
impl WinRmRunner for MultiRunner {
    async fn run_winrm(
        &self,
        host: &str,
        commands: &[String],
        credentials: &WinRmCredentials,
    ) -> Result<RunReport, RunError> {
        self.winrm.run_winrm(host, commands, credentials).await
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

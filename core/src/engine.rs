//! # Execution Engine
//!
//! Drives one deployment against one target: build the plan once, then walk
//! the auth order for the target's OS, one attempt at a time, until an
//! attempt succeeds or the failure policy says stop.
//!
//! Attempts never overlap. Each one gets its own deadline; the caller can put
//! an outer deadline on the whole call by wrapping the future in
//! [`tokio::time::timeout`], or cancel it by dropping the future.

use std::time::Duration;

use deployr_common::error::{ErrorCode, ErrorDetail};
use deployr_common::os::TargetOs;
use deployr_common::success;
use serde::Serialize;
use thiserror::Error;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

use crate::auth::{Attempt, AuthMethod, next_method, order_for_os};
use crate::inventory::LookupError;
use crate::plan::{InstallMethod, InstallRequest, PlanError, build_plan};
use crate::policy::{FailureAction, decide_next_action};
use crate::runner::{CommandRunner, CredentialSet, RunError, RunReport, WinRmCredentials};

pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(2 * 60);
pub const PREFLIGHT_COMMAND: &str = "whoami";

/// A successful deployment.
#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    pub method: AuthMethod,
    pub install_method: InstallMethod,
    pub report: RunReport,
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("unsupported os: {0}")]
    UnsupportedOs(TargetOs),

    #[error("missing credentials for {0} targets")]
    MissingCredentials(TargetOs),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("installer os does not match target os")]
    InstallerMismatch,

    /// A classified runtime failure the policy chose not to recover from.
    #[error("{method} failed: {detail}")]
    Failed {
        method: AuthMethod,
        detail: ErrorDetail,
        report: RunReport,
        attempts: Vec<Attempt>,
    },

    #[error("all auth methods failed")]
    Exhausted { attempts: Vec<Attempt> },

    #[error("authentication preflight failed")]
    PreflightFailed,
}

impl DeployError {
    /// The user-facing detail, when a code can be determined.
    pub fn detail(&self) -> Option<ErrorDetail> {
        match self {
            DeployError::Plan(_)
            | DeployError::MissingCredentials(_)
            | DeployError::Lookup(_)
            | DeployError::InstallerMismatch => {
                Some(ErrorDetail::new(ErrorCode::InstallFailed, self.to_string()))
            }
            DeployError::UnsupportedOs(_) => {
                Some(ErrorDetail::new(ErrorCode::UnsupportedOs, self.to_string()))
            }
            DeployError::PreflightFailed => {
                Some(ErrorDetail::new(ErrorCode::AuthDenied, self.to_string()))
            }
            DeployError::Failed { detail, .. } => Some(detail.clone()),
            DeployError::Exhausted { .. } => None,
        }
    }

    pub fn attempts(&self) -> &[Attempt] {
        match self {
            DeployError::Failed { attempts, .. } | DeployError::Exhausted { attempts } => attempts,
            _ => &[],
        }
    }
}

pub struct Engine {
    runner: Box<dyn CommandRunner>,
    attempt_timeout: Duration,
}

impl Engine {
    pub fn new(runner: Box<dyn CommandRunner>) -> Self {
        Self {
            runner,
            attempt_timeout: ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub async fn execute(
        &self,
        host: &str,
        os: TargetOs,
        request: &InstallRequest,
        credentials: &CredentialSet,
    ) -> Result<Deployment, DeployError> {
        let order = order_for_os(os);
        if order.is_empty() {
            return Err(DeployError::UnsupportedOs(os));
        }

        let mut request = request.clone();
        request.os = os;
        let plan = build_plan(&request)?;

        ensure_credentials(os, credentials)?;

        info!(host, %os, commands = plan.commands().len(), "Starting deployment");

        let mut attempts: Vec<Attempt> = Vec::new();
        while let Some(method) = next_method(order, &attempts) {
            debug!(host, %method, protocol = ?method.protocol(), "Trying auth method");

            let outcome = timeout(
                self.attempt_timeout,
                self.dispatch(host, method, plan.commands(), credentials),
            )
            .await;

            let (code, message, report) = match outcome {
                Ok(Ok(report)) => match report.failed_command() {
                    None => {
                        attempts.push(Attempt {
                            method,
                            error_code: None,
                        });
                        success!("Deployed to {host} via {method}");
                        return Ok(Deployment {
                            method,
                            install_method: plan.method,
                            report,
                            attempts,
                        });
                    }
                    Some(failed) => {
                        let message = format!(
                            "command exited with code {}: {}",
                            failed.exit_code, failed.command
                        );
                        (ErrorCode::InstallFailed, message, report)
                    }
                },
                Ok(Err(RunError { message, report })) => {
                    let code = if report.has_non_zero_exit() {
                        ErrorCode::InstallFailed
                    } else {
                        ErrorCode::AuthDenied
                    };
                    (code, message, report)
                }
                Err(_) => (
                    ErrorCode::AuthTimeout,
                    format!("attempt exceeded {}s", self.attempt_timeout.as_secs()),
                    RunReport {
                        host: host.to_string(),
                        ..RunReport::default()
                    },
                ),
            };

            attempts.push(Attempt {
                method,
                error_code: Some(code),
            });

            let remaining = next_method(order, &attempts).is_some();
            match decide_next_action(code, remaining, false) {
                FailureAction::SwitchAuth => {
                    warn!(host, %method, %code, "Auth attempt failed, falling back: {message}");
                }
                action => {
                    warn!(host, %method, %code, ?action, "Deployment failed: {message}");
                    return Err(DeployError::Failed {
                        method,
                        detail: ErrorDetail::new(code, message),
                        report,
                        attempts,
                    });
                }
            }
        }

        Err(DeployError::Exhausted { attempts })
    }

    /// Checks which auth method works by running a harmless command.
    pub async fn preflight(
        &self,
        host: &str,
        os: TargetOs,
        credentials: &CredentialSet,
    ) -> Result<AuthMethod, DeployError> {
        let order = order_for_os(os);
        if order.is_empty() {
            return Err(DeployError::UnsupportedOs(os));
        }
        ensure_credentials(os, credentials)?;

        let commands = [PREFLIGHT_COMMAND.to_string()];
        let deadline = Instant::now() + PREFLIGHT_TIMEOUT;

        for &method in order {
            match timeout_at(deadline, self.dispatch(host, method, &commands, credentials)).await {
                Ok(Ok(report)) if !report.has_non_zero_exit() => {
                    debug!(host, %method, "Preflight succeeded");
                    return Ok(method);
                }
                Ok(Ok(_)) => debug!(host, %method, "Preflight command failed"),
                Ok(Err(e)) => debug!(host, %method, "Preflight failed: {e}"),
                Err(_) => {
                    warn!(host, "Preflight ran out of time");
                    break;
                }
            }
        }

        Err(DeployError::PreflightFailed)
    }

    async fn dispatch(
        &self,
        host: &str,
        method: AuthMethod,
        commands: &[String],
        credentials: &CredentialSet,
    ) -> Result<RunReport, RunError> {
        match method {
            AuthMethod::SshKey => {
                let creds = credentials.ssh.key_only();
                if creds.private_key.is_none() {
                    return Err(RunError::before_execution(host, "no private key supplied"));
                }
                self.runner.run_ssh(host, commands, &creds).await
            }
            AuthMethod::SshPassword => {
                let creds = credentials.ssh.password_only();
                if creds.password.is_none() {
                    return Err(RunError::before_execution(host, "no password supplied"));
                }
                self.runner.run_ssh(host, commands, &creds).await
            }
            AuthMethod::WinrmHttpsCert | AuthMethod::WinrmHttpsUserPass => {
                let creds = WinRmCredentials {
                    use_https: true,
                    ..credentials.winrm.clone()
                };
                self.runner.run_winrm(host, commands, &creds).await
            }
        }
    }
}

fn ensure_credentials(os: TargetOs, credentials: &CredentialSet) -> Result<(), DeployError> {
    let usable = match os {
        TargetOs::Windows => credentials.winrm.is_usable(),
        _ => credentials.ssh.is_usable(),
    };
    if usable {
        Ok(())
    } else {
        Err(DeployError::MissingCredentials(os))
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

use deployr_common::error::ErrorCode;
use serde::Serialize;

/// What to do after a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureAction {
    RetrySame,
    SwitchAuth,
    SwitchInstall,
    Abort,
}

/// Decides the next step for a failure.
///
/// Total over every code. Anything not listed as recoverable aborts.
pub fn decide_next_action(
    code: ErrorCode,
    remaining_auth: bool,
    remaining_install: bool,
) -> FailureAction {
    match code {
        ErrorCode::AuthDenied | ErrorCode::AuthTimeout if remaining_auth => FailureAction::SwitchAuth,
        ErrorCode::InstallFailed if remaining_install => FailureAction::SwitchInstall,
        ErrorCode::NetworkIssue => FailureAction::RetrySame,
        _ => FailureAction::Abort,
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

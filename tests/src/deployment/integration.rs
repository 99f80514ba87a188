use deployr_common::error::ErrorCode;
use deployr_common::os::{OsFamily, TargetOs};
use deployr_core::auth::AuthMethod;
use deployr_core::deployment::DeploymentService;
use deployr_core::engine::{DeployError, Engine};
use deployr_core::inventory::{InstallerRecord, LookupError, TargetRecord};
use deployr_core::plan::{InstallRequest, PackageType};
use deployr_core::runner::{CredentialSet, SshCredentials, WinRmCredentials};

use crate::support::{MemoryInventory, Reply, ScriptedRunner};

const SUM: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

fn inventory() -> MemoryInventory {
    let mut inventory = MemoryInventory::default();
    inventory.targets.insert(
        "web".into(),
        TargetRecord {
            id: "web".into(),
            hostname: Some("web-01".into()),
            ip: Some("10.0.0.5".parse().unwrap()),
            os: TargetOs::Linux,
        },
    );
    inventory.targets.insert(
        "dc".into(),
        TargetRecord {
            id: "dc".into(),
            hostname: Some("dc-01.corp.local".into()),
            ip: None,
            os: TargetOs::Windows,
        },
    );
    inventory.targets.insert(
        "ghost".into(),
        TargetRecord {
            id: "ghost".into(),
            hostname: None,
            ip: None,
            os: TargetOs::Linux,
        },
    );
    inventory.installers.insert(
        "agent-deb".into(),
        InstallerRecord {
            id: "agent-deb".into(),
            binary_url: "https://repo.example.com/agent.deb".into(),
            package_type: Some(PackageType::Deb),
            checksum: Some(SUM.into()),
            os_family: OsFamily::Linux,
        },
    );
    inventory.installers.insert(
        "agent-any".into(),
        InstallerRecord {
            id: "agent-any".into(),
            binary_url: "https://repo.example.com/agent".into(),
            package_type: None,
            checksum: None,
            os_family: OsFamily::Any,
        },
    );
    inventory
}

fn credentials() -> CredentialSet {
    CredentialSet {
        ssh: SshCredentials {
            username: "ops".into(),
            password: Some("pw".into()),
            private_key: Some("KEY".into()),
        },
        winrm: WinRmCredentials {
            username: "Administrator".into(),
            password: "pw".into(),
            ..WinRmCredentials::default()
        },
    }
}

fn service(runner: &ScriptedRunner) -> DeploymentService {
    let inventory = inventory();
    DeploymentService::new(
        Box::new(inventory.clone()),
        Box::new(inventory),
        Engine::new(Box::new(runner.clone())),
    )
}

#[tokio::test]
async fn installer_record_overrides_request_and_ip_is_preferred() {
    let runner = ScriptedRunner::new(vec![Reply::Ok]);
    let request = InstallRequest {
        binary_url: "https://ignored.example.com/other.rpm".into(),
        execute_on_install: true,
        post_install_args: vec!["--enroll".into()],
        ..InstallRequest::default()
    };

    let deployment = service(&runner)
        .deploy("web", &request, Some("agent-deb"), &credentials())
        .await
        .unwrap();

    assert_eq!(deployment.method, AuthMethod::SshKey);
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].host, "10.0.0.5");
    assert!(calls[0].ssh);

    let commands = &calls[0].commands;
    assert!(commands.iter().any(|c| c.contains("https://repo.example.com/agent.deb")));
    assert!(!commands.iter().any(|c| c.contains("ignored.example.com")));
    assert!(commands.iter().any(|c| c.contains("sha256sum -c -")));
    assert!(commands.iter().any(|c| c.starts_with("sudo dpkg -i")));
    assert!(commands.iter().any(|c| c.ends_with("\"--enroll\"")));
}

#[tokio::test]
async fn hostname_is_used_when_no_ip_is_stored() {
    let runner = ScriptedRunner::new(vec![Reply::Ok]);
    let request = InstallRequest::default();

    let deployment = service(&runner)
        .deploy("dc", &request, Some("agent-any"), &credentials())
        .await
        .unwrap();

    assert_eq!(deployment.method, AuthMethod::WinrmHttpsCert);
    let calls = runner.calls();
    assert_eq!(calls[0].host, "dc-01.corp.local");
    assert!(!calls[0].ssh);
    assert!(calls[0].commands[0].starts_with("powershell -NoProfile -Command"));
}

#[tokio::test]
async fn installer_family_must_match_target() {
    let runner = ScriptedRunner::new(vec![]);

    let err = service(&runner)
        .deploy("dc", &InstallRequest::default(), Some("agent-deb"), &credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::InstallerMismatch));
    assert_eq!(err.to_string(), "installer os does not match target os");
    assert_eq!(err.detail().unwrap().code, ErrorCode::InstallFailed);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn lookup_failures_surface_before_execution() {
    let runner = ScriptedRunner::new(vec![]);
    let svc = service(&runner);

    let err = svc
        .deploy("nope", &InstallRequest::default(), None, &credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Lookup(LookupError::TargetNotFound(_))));

    let err = svc
        .deploy("ghost", &InstallRequest::default(), Some("agent-any"), &credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Lookup(LookupError::NoAddress(_))));

    let err = svc
        .deploy("web", &InstallRequest::default(), Some("missing"), &credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Lookup(LookupError::InstallerNotFound(_))));

    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn failure_detail_carries_code_and_remediation() {
    let runner = ScriptedRunner::new(vec![Reply::Refused, Reply::ExitCode(2)]);

    let err = service(&runner)
        .deploy("web", &InstallRequest::default(), Some("agent-any"), &credentials())
        .await
        .unwrap_err();

    let detail = err.detail().unwrap();
    assert_eq!(detail.code, ErrorCode::InstallFailed);
    assert_eq!(detail.remediation, ErrorCode::InstallFailed.remediation());
    assert_eq!(
        err.attempts()
            .iter()
            .map(|a| (a.method, a.error_code))
            .collect::<Vec<_>>(),
        vec![
            (AuthMethod::SshKey, Some(ErrorCode::AuthDenied)),
            (AuthMethod::SshPassword, Some(ErrorCode::InstallFailed)),
        ]
    );

    let json = serde_json::to_value(err.attempts()).unwrap();
    assert_eq!(json[0]["method"], "ssh_key");
    assert_eq!(json[1]["error_code"], "install_failed");
}

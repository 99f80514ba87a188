//! Fakes for the capabilities the core consumes.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deployr_core::inventory::{
    InstallerLookup, InstallerRecord, LookupError, TargetLookup, TargetRecord,
};
use deployr_core::runner::{
    CommandResult, RunError, RunReport, SshCredentials, SshRunner, WinRmCredentials, WinRmRunner,
};

pub enum Reply {
    Ok,
    ExitCode(i32),
    Refused,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub host: String,
    pub commands: Vec<String>,
    pub ssh: bool,
}

/// Plays back canned replies, one per call, and records every call.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedRunner {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn reply(&self, host: &str, commands: &[String], ssh: bool) -> Result<RunReport, RunError> {
        self.calls.lock().unwrap().push(Call {
            host: host.to_string(),
            commands: commands.to_vec(),
            ssh,
        });

        let mut report = RunReport {
            host: host.to_string(),
            ..RunReport::default()
        };
        match self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Ok) {
            Reply::Ok => {
                report.results = commands
                    .iter()
                    .map(|c| CommandResult {
                        command: c.clone(),
                        ..CommandResult::default()
                    })
                    .collect();
                Ok(report)
            }
            Reply::ExitCode(code) => {
                report.results.push(CommandResult {
                    command: commands[0].clone(),
                    stderr: "boom".into(),
                    exit_code: code,
                    ..CommandResult::default()
                });
                Err(RunError::new("remote command failed", report))
            }
            Reply::Refused => Err(RunError::new("connection refused", report)),
        }
    }
}

#[async_trait]
impl SshRunner for ScriptedRunner {
    async fn run_ssh(
        &self,
        host: &str,
        commands: &[String],
        _credentials: &SshCredentials,
    ) -> Result<RunReport, RunError> {
        self.reply(host, commands, true)
    }
}

#[async_trait]
impl WinRmRunner for ScriptedRunner {
    async fn run_winrm(
        &self,
        host: &str,
        commands: &[String],
        _credentials: &WinRmCredentials,
    ) -> Result<RunReport, RunError> {
        self.reply(host, commands, false)
    }
}

#[derive(Clone, Default)]
pub struct MemoryInventory {
    pub targets: HashMap<String, TargetRecord>,
    pub installers: HashMap<String, InstallerRecord>,
}

#[async_trait]
impl TargetLookup for MemoryInventory {
    async fn target(&self, id: &str) -> Result<TargetRecord, LookupError> {
        self.targets
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::TargetNotFound(id.to_string()))
    }
}

#[async_trait]
impl InstallerLookup for MemoryInventory {
    async fn installer(&self, id: &str) -> Result<InstallerRecord, LookupError> {
        self.installers
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::InstallerNotFound(id.to_string()))
    }
}

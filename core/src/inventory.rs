//! Lookup capabilities for stored targets and installers.
//!
//! Storage lives outside this crate; the deployment service only needs to
//! read a record by id.

use std::net::IpAddr;

use async_trait::async_trait;
use deployr_common::os::{OsFamily, TargetOs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::PackageType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub id: String,
    pub hostname: Option<String>,
    pub ip: Option<IpAddr>,
    pub os: TargetOs,
}

impl TargetRecord {
    /// The IP when known, the hostname otherwise.
    pub fn address(&self) -> Option<String> {
        match (&self.ip, &self.hostname) {
            (Some(ip), _) => Some(ip.to_string()),
            (None, Some(name)) if !name.trim().is_empty() => Some(name.trim().to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerRecord {
    pub id: String,
    pub binary_url: String,
    pub package_type: Option<PackageType>,
    pub checksum: Option<String>,
    pub os_family: OsFamily,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("installer not found: {0}")]
    InstallerNotFound(String),

    #[error("target {0} has neither an ip nor a hostname")]
    NoAddress(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait TargetLookup: Send + Sync {
    async fn target(&self, id: &str) -> Result<TargetRecord, LookupError>;
}

#[async_trait]
pub trait InstallerLookup: Send + Sync {
    async fn installer(&self, id: &str) -> Result<InstallerRecord, LookupError>;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

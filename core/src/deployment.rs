//! # Deployment Service
//!
//! Resolves stored records into an engine call: the target decides the
//! address and OS, an optional installer record decides what gets installed.

use deployr_common::os::TargetOs;
use tracing::{debug, info};

use crate::engine::{DeployError, Deployment, Engine};
use crate::inventory::{InstallerLookup, LookupError, TargetLookup};
use crate::plan::InstallRequest;
use crate::runner::CredentialSet;

pub struct DeploymentService {
    targets: Box<dyn TargetLookup>,
    installers: Box<dyn InstallerLookup>,
    engine: Engine,
}

impl DeploymentService {
    pub fn new(
        targets: Box<dyn TargetLookup>,
        installers: Box<dyn InstallerLookup>,
        engine: Engine,
    ) -> Self {
        Self {
            targets,
            installers,
            engine,
        }
    }

    pub async fn deploy(
        &self,
        target_id: &str,
        request: &InstallRequest,
        installer_id: Option<&str>,
        credentials: &CredentialSet,
    ) -> Result<Deployment, DeployError> {
        let target = self.targets.target(target_id).await?;
        let address = target
            .address()
            .ok_or_else(|| LookupError::NoAddress(target.id.clone()))?;

        let request = match installer_id {
            Some(id) => self.apply_installer(id, request, target.os).await?,
            None => request.clone(),
        };

        info!(target = target_id, %address, os = %target.os, "Deploying to target");
        self.engine
            .execute(&address, target.os, &request, credentials)
            .await
    }

    async fn apply_installer(
        &self,
        installer_id: &str,
        request: &InstallRequest,
        os: TargetOs,
    ) -> Result<InstallRequest, DeployError> {
        let installer = self.installers.installer(installer_id).await?;
        if !installer.os_family.matches(os) {
            return Err(DeployError::InstallerMismatch);
        }

        debug!(installer = installer_id, url = %installer.binary_url, "Using stored installer");
        Ok(InstallRequest {
            binary_url: installer.binary_url,
            package_type: installer.package_type,
            checksum: installer.checksum,
            ..request.clone()
        })
    }
}

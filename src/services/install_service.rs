use std::path::Path;

use crate::domain::{InstalledService, ServiceManifest};
use crate::errors::{ServiceError, ServiceResult};
use crate::storage::traits::InstalledServiceRepository;

/// What an install did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Replaced,
}

pub struct InstallService<R: InstalledServiceRepository> {
    repository: R,
}

impl<R: InstalledServiceRepository> InstallService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Install a manifest document from disk.
    /// Validates it and stores the raw document under its id.
    pub fn install<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> ServiceResult<(ServiceManifest, InstallOutcome)> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ServiceError::ManifestRead {
            path: path.display().to_string(),
            source,
        })?;

        self.install_document(&document)
    }

    /// Install from an in-memory document. Reinstalling an id replaces the
    /// stored document wholesale.
    pub fn install_document(
        &self,
        document: &str,
    ) -> ServiceResult<(ServiceManifest, InstallOutcome)> {
        let manifest = ServiceManifest::parse(document)?;

        let record = InstalledService::new(manifest.id.clone(), document);
        let replaced = self.repository.upsert(&record)?;

        let outcome = if replaced {
            tracing::info!(id = %manifest.id, "installed service replaced");
            InstallOutcome::Replaced
        } else {
            tracing::info!(id = %manifest.id, "service installed");
            InstallOutcome::Installed
        };

        Ok((manifest, outcome))
    }

    /// Remove an installed service by id
    pub fn uninstall(&self, id: &str) -> ServiceResult<()> {
        if !self.repository.remove(id)? {
            return Err(ServiceError::ServiceNotFound(id.to_string()));
        }

        tracing::info!(id, "service uninstalled");
        Ok(())
    }

    /// All stored records, ready to hand to the registry
    pub fn list(&self) -> ServiceResult<Vec<InstalledService>> {
        self.repository.get_all()
    }

    pub fn get(&self, id: &str) -> ServiceResult<Option<InstalledService>> {
        self.repository.get_by_id(id)
    }

    pub fn is_installed(&self, id: &str) -> ServiceResult<bool> {
        self.repository.exists(id)
    }
}

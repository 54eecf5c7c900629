//! Service registry: binds manifests from the built-in and installed origins
//! to constructed service instances.
//!
//! Loading never fails as a whole. Each manifest that does not parse and each
//! service that does not construct is left out and listed in the
//! [`LoadReport`]; everything else is registered.

pub mod builtin;
pub mod installed;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{InstalledService, ServiceManifest};
use crate::errors::{ServiceError, ServiceResult};
use crate::features::FeatureKind;
use crate::net::HttpClient;
use crate::service::{AnyService, ServiceConfig, ServiceContext, ServiceFactory};

pub use builtin::{BuiltinServiceDataSource, BuiltinServicesLoader, BundledService};
pub use installed::{load_installed, ServiceRuntime};

/// A parsed manifest and, when its code is available, the factory for it.
#[derive(Clone)]
pub struct BoundService {
    pub manifest: ServiceManifest,
    pub factory: Option<Arc<dyn ServiceFactory>>,
}

impl std::fmt::Debug for BoundService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundService")
            .field("manifest", &self.manifest)
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

/// Which origin wins when a built-in and an installed manifest share an id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    #[default]
    PreferInstalled,
    PreferBuiltin,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::PreferInstalled => "installed",
            MergePolicy::PreferBuiltin => "builtin",
        }
    }
}

impl std::str::FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "installed" | "prefer_installed" => Ok(MergePolicy::PreferInstalled),
            "builtin" | "prefer_builtin" => Ok(MergePolicy::PreferBuiltin),
            _ => Err(format!("Unknown merge policy: {}", s)),
        }
    }
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry that was left out of the registry, and why.
#[derive(Debug)]
pub struct LoadProblem {
    pub source: String,
    pub error: ServiceError,
}

impl LoadProblem {
    pub fn new(source: impl Into<String>, error: ServiceError) -> Self {
        Self {
            source: source.into(),
            error,
        }
    }
}

impl std::fmt::Display for LoadProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub problems: Vec<LoadProblem>,
    /// Ids whose losing manifest was shadowed by the merge policy.
    pub shadowed: Vec<String>,
    /// Installed ids catalogued without an implementation.
    pub unbound: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

struct RegistryEntry {
    manifest: ServiceManifest,
    factory: Option<Arc<dyn ServiceFactory>>,
    service: Option<AnyService>,
}

pub struct RegistryBuilder {
    http: Arc<dyn HttpClient>,
    policy: MergePolicy,
    builtins: Vec<BoundService>,
    installed: Vec<InstalledService>,
    runtime: Option<Arc<dyn ServiceRuntime>>,
    problems: Vec<LoadProblem>,
}

impl RegistryBuilder {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            policy: MergePolicy::default(),
            builtins: Vec::new(),
            installed: Vec::new(),
            runtime: None,
            problems: Vec::new(),
        }
    }

    pub fn policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn builtins(mut self, loader: &BuiltinServicesLoader) -> Self {
        let (bound, problems) = loader.load();
        self.builtins.extend(bound);
        self.problems.extend(problems);
        self
    }

    pub fn installed(mut self, records: Vec<InstalledService>) -> Self {
        self.installed.extend(records);
        self
    }

    pub fn runtime(mut self, runtime: Arc<dyn ServiceRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> (ServiceRegistry, LoadReport) {
        let mut report = LoadReport {
            problems: self.problems,
            ..LoadReport::default()
        };

        let (installed, problems) = load_installed(&self.installed, self.runtime.as_deref());
        report.problems.extend(problems);

        // Construct before merging so a broken override does not hide a
        // working service of the other origin.
        let builtins = construct_all(self.builtins, &self.http, &mut report);
        let installed = construct_all(installed, &self.http, &mut report);

        let mut entries: BTreeMap<String, RegistryEntry> = BTreeMap::new();
        let mut shadowed = Vec::new();

        let (first, second) = match self.policy {
            MergePolicy::PreferInstalled => (installed, builtins),
            MergePolicy::PreferBuiltin => (builtins, installed),
        };

        for entry in first {
            entries.insert(entry.manifest.id.clone(), entry);
        }

        for entry in second {
            let id = entry.manifest.id.clone();
            let loser = match entries.remove(&id) {
                None => {
                    entries.insert(id, entry);
                    continue;
                }
                // A bound service is never hidden behind an unbound manifest.
                Some(existing) if existing.service.is_none() && entry.service.is_some() => {
                    entries.insert(id.clone(), entry);
                    existing
                }
                Some(existing) => {
                    entries.insert(id.clone(), existing);
                    entry
                }
            };

            tracing::info!(
                id = %id,
                policy = %self.policy,
                "{} manifest shadowed",
                loser.manifest.provenance()
            );
            report.shadowed.push(id);
            shadowed.push(loser.manifest);
        }

        report.unbound = entries
            .values()
            .filter(|e| e.factory.is_none())
            .map(|e| e.manifest.id.clone())
            .collect();

        for problem in &report.problems {
            tracing::warn!(source = %problem.source, error = %problem.error, "service skipped");
        }

        tracing::debug!(count = entries.len(), "service registry loaded");

        (
            ServiceRegistry {
                entries,
                shadowed,
                http: self.http,
            },
            report,
        )
    }
}

/// Construct every bound service with default configs, dropping duplicates
/// within the origin and services whose factory fails.
fn construct_all(
    bound: Vec<BoundService>,
    http: &Arc<dyn HttpClient>,
    report: &mut LoadReport,
) -> Vec<RegistryEntry> {
    let mut entries: Vec<RegistryEntry> = Vec::new();

    for candidate in bound {
        let label = format!("{}:{}", candidate.manifest.provenance(), candidate.manifest.id);

        if entries.iter().any(|e| e.manifest.id == candidate.manifest.id) {
            report.problems.push(LoadProblem::new(
                label,
                ServiceError::DuplicateId(candidate.manifest.id.clone()),
            ));
            continue;
        }

        let service = match &candidate.factory {
            Some(factory) => {
                let context = ServiceContext::new(
                    candidate.manifest.clone(),
                    ServiceConfig::new(),
                    Arc::clone(http),
                );
                match AnyService::construct(factory.as_ref(), context) {
                    Ok(service) => Some(service),
                    Err(error) => {
                        report.problems.push(LoadProblem::new(label, error));
                        continue;
                    }
                }
            }
            None => None,
        };

        entries.push(RegistryEntry {
            manifest: candidate.manifest,
            factory: candidate.factory,
            service,
        });
    }

    entries
}

/// All registered services, keyed by manifest id.
pub struct ServiceRegistry {
    entries: BTreeMap<String, RegistryEntry>,
    shadowed: Vec<ServiceManifest>,
    http: Arc<dyn HttpClient>,
}

impl ServiceRegistry {
    /// The default-config instance for `id`, if it is bound.
    pub fn get(&self, id: &str) -> Option<&AnyService> {
        self.entries.get(id).and_then(|e| e.service.as_ref())
    }

    pub fn manifest(&self, id: &str) -> Option<&ServiceManifest> {
        self.entries.get(id).map(|e| &e.manifest)
    }

    /// Every registered manifest regardless of origin, sorted by id.
    pub fn manifests(&self) -> Vec<&ServiceManifest> {
        self.entries.values().map(|e| &e.manifest).collect()
    }

    pub fn is_bound(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .map(|e| e.service.is_some())
            .unwrap_or(false)
    }

    pub fn services(&self) -> impl Iterator<Item = &AnyService> {
        self.entries.values().filter_map(|e| e.service.as_ref())
    }

    /// Bound services that declared `kind`.
    pub fn supporting(&self, kind: FeatureKind) -> Vec<&AnyService> {
        self.services().filter(|s| s.supports(kind)).collect()
    }

    /// Build a fresh, independent instance of `id` with the given configs.
    pub fn instantiate(&self, id: &str, configs: ServiceConfig) -> ServiceResult<AnyService> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| ServiceError::ServiceNotFound(id.to_string()))?;

        let factory = entry
            .factory
            .as_ref()
            .ok_or_else(|| ServiceError::Unbound(id.to_string()))?;

        let context = ServiceContext::new(entry.manifest.clone(), configs, Arc::clone(&self.http));
        AnyService::construct(factory.as_ref(), context)
    }

    /// Manifests that lost an id collision.
    pub fn shadowed(&self) -> &[ServiceManifest] {
        &self.shadowed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

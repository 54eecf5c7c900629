use std::sync::Arc;

use crate::domain::ServiceManifest;
use crate::service::ServiceFactory;

use super::{BoundService, LoadProblem};

/// One service compiled into the host: its manifest document and factory.
#[derive(Clone)]
pub struct BundledService {
    /// Where the document came from, used when reporting a bad entry.
    pub label: String,
    pub document: String,
    pub factory: Arc<dyn ServiceFactory>,
}

impl BundledService {
    pub fn new(
        label: impl Into<String>,
        document: impl Into<String>,
        factory: Arc<dyn ServiceFactory>,
    ) -> Self {
        Self {
            label: label.into(),
            document: document.into(),
            factory,
        }
    }
}

impl std::fmt::Debug for BundledService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundledService")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Supplies the raw bundled entries. Documents are parsed by the loader.
pub trait BuiltinServiceDataSource: Send + Sync {
    fn get_all(&self) -> Vec<BundledService>;
}

impl BuiltinServiceDataSource for Vec<BundledService> {
    fn get_all(&self) -> Vec<BundledService> {
        self.clone()
    }
}

/// Parses bundled documents and stamps them as built-in.
pub struct BuiltinServicesLoader {
    source: Box<dyn BuiltinServiceDataSource>,
}

impl BuiltinServicesLoader {
    pub fn new(source: impl BuiltinServiceDataSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Bound entries plus one problem per document that failed to parse.
    pub fn load(&self) -> (Vec<BoundService>, Vec<LoadProblem>) {
        let mut bound = Vec::new();
        let mut problems = Vec::new();

        for bundled in self.source.get_all() {
            match ServiceManifest::parse(&bundled.document) {
                Ok(manifest) => bound.push(BoundService {
                    manifest: manifest.mark_as_builtin(),
                    factory: Some(bundled.factory),
                }),
                Err(error) => problems.push(LoadProblem::new(bundled.label, error)),
            }
        }

        (bound, problems)
    }

    /// Manifests of every bundled service that parsed, stamped as built-in.
    pub fn load_all(&self) -> Vec<ServiceManifest> {
        self.load().0.into_iter().map(|b| b.manifest).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceResult;
    use crate::features::FeatureSet;
    use crate::service::ServiceContext;

    fn factory() -> Arc<dyn ServiceFactory> {
        Arc::new(|_: &ServiceContext| -> ServiceResult<FeatureSet> { Ok(FeatureSet::new()) })
    }

    #[test]
    fn test_load_all_stamps_builtin() {
        let loader = BuiltinServicesLoader::new(vec![
            BundledService::new("a", r#"{"id": "a", "name": "A"}"#, factory()),
            BundledService::new("b", r#"{"id": "b", "name": "B"}"#, factory()),
        ]);

        let manifests = loader.load_all();
        assert_eq!(manifests.len(), 2);
        assert!(manifests.iter().all(|m| m.is_builtin()));
        assert_eq!(manifests[0].name, "A");
    }

    #[test]
    fn test_bad_document_is_reported_not_fatal() {
        let loader = BuiltinServicesLoader::new(vec![
            BundledService::new("broken.json", r#"{"id": "broken"}"#, factory()),
            BundledService::new("ok.json", r#"{"id": "ok", "name": "Ok"}"#, factory()),
        ]);

        let (bound, problems) = loader.load();
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].manifest.id, "ok");
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].source, "broken.json");
    }
}

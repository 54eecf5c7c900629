use std::sync::Arc;

use crate::domain::{InstalledService, ServiceManifest};
use crate::errors::{ServiceError, ServiceResult};
use crate::service::ServiceFactory;

use super::{BoundService, LoadProblem};

/// Host-supplied execution environment for installed services.
///
/// Turns an installed manifest into the factory that runs its code inside
/// whatever isolation the host provides.
pub trait ServiceRuntime: Send + Sync {
    fn bind(&self, manifest: &ServiceManifest) -> ServiceResult<Arc<dyn ServiceFactory>>;
}

/// Parse stored documents and bind them through `runtime`, if any.
///
/// Without a runtime every parsed manifest is kept unbound.
pub fn load_installed(
    records: &[InstalledService],
    runtime: Option<&dyn ServiceRuntime>,
) -> (Vec<BoundService>, Vec<LoadProblem>) {
    let mut bound = Vec::new();
    let mut problems = Vec::new();

    for record in records {
        let label = format!("installed:{}", record.id);

        let manifest = match ServiceManifest::parse(&record.document) {
            Ok(manifest) if manifest.id == record.id => manifest,
            Ok(manifest) => {
                problems.push(LoadProblem::new(
                    label,
                    ServiceError::InvalidManifest(format!(
                        "stored under '{}' but declares id '{}'",
                        record.id, manifest.id
                    )),
                ));
                continue;
            }
            Err(error) => {
                problems.push(LoadProblem::new(label, error));
                continue;
            }
        };

        match runtime.map(|rt| rt.bind(&manifest)) {
            Some(Ok(factory)) => bound.push(BoundService {
                manifest,
                factory: Some(factory),
            }),
            Some(Err(error)) => problems.push(LoadProblem::new(label, error)),
            None => bound.push(BoundService {
                manifest,
                factory: None,
            }),
        }
    }

    (bound, problems)
}

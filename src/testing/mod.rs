//! Harness for exercising a service in isolation.
//!
//! ```no_run
//! use servicehub::testing::{create_test_service, TestServiceOptions};
//! # use servicehub::features::FeatureSet;
//! # use servicehub::service::ServiceContext;
//! # fn my_service(_: &ServiceContext) -> servicehub::errors::ServiceResult<FeatureSet> {
//! #     Ok(FeatureSet::new())
//! # }
//!
//! let service = create_test_service(
//!     TestServiceOptions::with_class(my_service, "tests/fixtures/me_service/manifest.json")
//!         .config("section", "home"),
//! )
//! .unwrap();
//! assert_eq!(service.manifest().id, "me.service");
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::domain::ServiceManifest;
use crate::errors::ServiceResult;
use crate::features::{ErrorInfo, FeatureSet};
use crate::net::{HttpClient, HttpRequest, HttpResponse};
use crate::service::{AnyService, ServiceConfig, ServiceContext, ServiceFactory};

/// Canned HTTP responses keyed by URL.
///
/// Unknown URLs fail with a `network` error. Every requested URL is
/// recorded so tests can assert on traffic.
#[derive(Debug, Default)]
pub struct FixtureClient {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

impl FixtureClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.respond_with(url, HttpResponse::new(status, body))
    }

    pub fn respond_with(mut self, url: impl Into<String>, response: HttpResponse) -> Self {
        self.responses.insert(url.into(), response);
        self
    }

    pub fn respond_json(self, url: impl Into<String>, body: &Value) -> Self {
        self.respond(url, 200, body.to_string())
    }

    /// Serve the contents of a file, read now.
    pub fn respond_file<P: AsRef<Path>>(
        self,
        url: impl Into<String>,
        path: P,
    ) -> ServiceResult<Self> {
        let body = std::fs::read_to_string(path)?;
        Ok(self.respond(url, 200, body))
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl HttpClient for FixtureClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ErrorInfo> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.url.clone());
        }

        self.responses
            .get(&request.url)
            .cloned()
            .ok_or_else(|| ErrorInfo::network(format!("no fixture for {}", request.url)))
    }
}

enum Implementation {
    Class(Arc<dyn ServiceFactory>),
    Features(FeatureSet),
}

pub struct TestServiceOptions {
    implementation: Implementation,
    manifest_path: PathBuf,
    configs: ServiceConfig,
    http: Option<Arc<dyn HttpClient>>,
}

impl TestServiceOptions {
    /// Construct through a service factory, as the registry would.
    pub fn with_class(
        factory: impl ServiceFactory + 'static,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            implementation: Implementation::Class(Arc::new(factory)),
            manifest_path: manifest_path.into(),
            configs: ServiceConfig::new(),
            http: None,
        }
    }

    /// Wrap a loose set of feature implementations.
    pub fn with_features(features: FeatureSet, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            implementation: Implementation::Features(features),
            manifest_path: manifest_path.into(),
            configs: ServiceConfig::new(),
            http: None,
        }
    }

    pub fn config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configs = self.configs.with(key, value);
        self
    }

    pub fn configs(mut self, configs: ServiceConfig) -> Self {
        self.configs = configs;
        self
    }

    pub fn http(mut self, client: impl HttpClient + 'static) -> Self {
        self.http = Some(Arc::new(client));
        self
    }

    pub fn shared_http(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http = Some(client);
        self
    }
}

/// Build a fully wired service from a manifest file.
///
/// The manifest is parsed fresh on every call and, unless a client is
/// given, the service gets its own empty `FixtureClient`.
pub fn create_test_service(options: TestServiceOptions) -> ServiceResult<AnyService> {
    let manifest = ServiceManifest::from_file(&options.manifest_path)?;
    let http = options
        .http
        .unwrap_or_else(|| Arc::new(FixtureClient::new()));

    match options.implementation {
        Implementation::Class(factory) => {
            let context = ServiceContext::new(manifest, options.configs, http);
            AnyService::construct(factory.as_ref(), context)
        }
        Implementation::Features(features) => {
            Ok(AnyService::from_features(manifest, options.configs, features))
        }
    }
}

/// Like [`create_test_service`] but from an in-memory manifest document.
pub fn create_test_service_from_str(
    document: &str,
    factory: impl ServiceFactory + 'static,
    configs: ServiceConfig,
) -> ServiceResult<AnyService> {
    let manifest = ServiceManifest::parse(document)?;
    let context = ServiceContext::new(manifest, configs, Arc::new(FixtureClient::new()));
    AnyService::construct(&factory, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::features::FeatureKind;

    #[test]
    fn test_fixture_client_records_and_fails_unknown() {
        let client = FixtureClient::new().respond("https://x/1", 200, "one");

        assert_eq!(client.get("https://x/1").unwrap().body, "one");
        let err = client.get("https://x/2").unwrap_err();
        assert_eq!(err.kind, crate::features::ErrorKind::Network);
        assert_eq!(client.requests(), vec!["https://x/1", "https://x/2"]);
    }

    #[test]
    fn test_harness_from_temp_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, r#"{"id": "me.service", "name": "MyService"}"#).unwrap();

        let service = create_test_service(
            TestServiceOptions::with_features(FeatureSet::new(), &path).config("section", "home"),
        )
        .unwrap();

        assert_eq!(service.manifest().id, "me.service");
        assert_eq!(service.manifest().name, "MyService");
        assert_eq!(service.configs().get_str("section"), Some("home"));
        assert!(!service.supports(FeatureKind::Post));
    }

    #[test]
    fn test_harness_missing_manifest() {
        let result = create_test_service(TestServiceOptions::with_features(
            FeatureSet::new(),
            "/nonexistent/manifest.json",
        ));
        assert!(matches!(result, Err(ServiceError::ManifestRead { .. })));
    }

    #[test]
    fn test_harness_from_str() {
        let service = create_test_service_from_str(
            r#"{"id": "inline", "name": "Inline"}"#,
            |_: &ServiceContext| -> ServiceResult<FeatureSet> { Ok(FeatureSet::new()) },
            ServiceConfig::new(),
        )
        .unwrap();
        assert_eq!(service.id(), "inline");
    }
}

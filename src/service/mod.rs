//! The service base every plugin is wired through.
//!
//! A plugin author supplies a [`ServiceFactory`] (the "service class"). The
//! host hands it a [`ServiceContext`] and receives the [`FeatureSet`] the
//! plugin declares; [`AnyService`] binds the two to the plugin's manifest.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::ServiceManifest;
use crate::errors::{ServiceError, ServiceResult};
use crate::features::{FeatureKind, FeatureRef, FeatureSet};
use crate::net::HttpClient;

/// Operating parameters for one instance, e.g. `{"section": "home"}`.
///
/// Keys a service does not recognize are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ServiceConfig(Map<String, Value>);

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object. Anything else is rejected.
    pub fn from_value(value: Value) -> ServiceResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ServiceError::InvalidInput(format!(
                "service config must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Parse `key=value` pairs as given on the command line.
    ///
    /// Values that parse as JSON keep their type; anything else is a string.
    pub fn from_pairs<I, S>(pairs: I) -> ServiceResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, raw) = pair.split_once('=').ok_or_else(|| {
                ServiceError::InvalidInput(format!("expected key=value, got '{}'", pair))
            })?;
            let value =
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            config = config.with(key.trim(), value);
        }
        Ok(config)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything a plugin receives when it is constructed.
#[derive(Clone)]
pub struct ServiceContext {
    pub manifest: ServiceManifest,
    pub configs: ServiceConfig,
    pub http: Arc<dyn HttpClient>,
}

impl ServiceContext {
    pub fn new(
        manifest: ServiceManifest,
        configs: ServiceConfig,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            manifest,
            configs,
            http,
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("manifest", &self.manifest)
            .field("configs", &self.configs)
            .finish_non_exhaustive()
    }
}

/// Constructs a plugin's features for a given context.
pub trait ServiceFactory: Send + Sync {
    fn create(&self, context: &ServiceContext) -> ServiceResult<FeatureSet>;
}

impl<F> ServiceFactory for F
where
    F: Fn(&ServiceContext) -> ServiceResult<FeatureSet> + Send + Sync,
{
    fn create(&self, context: &ServiceContext) -> ServiceResult<FeatureSet> {
        self(context)
    }
}

/// A constructed service: its manifest bound to the features it declared.
pub struct AnyService {
    manifest: ServiceManifest,
    configs: ServiceConfig,
    features: FeatureSet,
}

impl AnyService {
    /// Run `factory` against `context`.
    ///
    /// Any factory error is reported as `ServiceError::Construction` for the
    /// manifest's id.
    pub fn construct(factory: &dyn ServiceFactory, context: ServiceContext) -> ServiceResult<Self> {
        let features = factory.create(&context).map_err(|e| match e {
            ServiceError::Construction { .. } => e,
            other => ServiceError::Construction {
                id: context.manifest.id.clone(),
                reason: other.to_string(),
            },
        })?;

        Ok(Self::from_features(context.manifest, context.configs, features))
    }

    pub fn from_features(
        manifest: ServiceManifest,
        configs: ServiceConfig,
        features: FeatureSet,
    ) -> Self {
        Self {
            manifest,
            configs,
            features,
        }
    }

    pub fn manifest(&self) -> &ServiceManifest {
        &self.manifest
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn configs(&self) -> &ServiceConfig {
        &self.configs
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn get_feature(&self, kind: FeatureKind) -> ServiceResult<FeatureRef<'_>> {
        self.features.get(kind)
    }

    pub fn supports(&self, kind: FeatureKind) -> bool {
        self.features.supports(kind)
    }
}

impl std::fmt::Debug for AnyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyService")
            .field("manifest", &self.manifest)
            .field("configs", &self.configs)
            .field("features", &self.features)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::post::MockPostFeature;
    use crate::net::MockHttpClient;

    fn context(configs: ServiceConfig) -> ServiceContext {
        ServiceContext::new(
            ServiceManifest::new("me.service", "MyService"),
            configs,
            Arc::new(MockHttpClient::new()),
        )
    }

    #[test]
    fn test_config_typed_getters() {
        let config = ServiceConfig::new()
            .with("section", "home")
            .with("limit", 24)
            .with("nsfw", false);

        assert_eq!(config.get_str("section"), Some("home"));
        assert_eq!(config.get_u64("limit"), Some(24));
        assert_eq!(config.get_bool("nsfw"), Some(false));
        assert!(config.get("unknown").is_none());
    }

    #[test]
    fn test_config_from_pairs() {
        let config =
            ServiceConfig::from_pairs(["section=home", "limit=10", "url=https://x/feed"]).unwrap();

        assert_eq!(config.get_str("section"), Some("home"));
        assert_eq!(config.get_u64("limit"), Some(10));
        assert_eq!(config.get_str("url"), Some("https://x/feed"));

        assert!(ServiceConfig::from_pairs(["novalue"]).is_err());
    }

    #[test]
    fn test_config_from_value_rejects_non_objects() {
        assert!(ServiceConfig::from_value(serde_json::json!({"a": 1})).is_ok());
        assert!(ServiceConfig::from_value(serde_json::Value::Null).unwrap().is_empty());
        assert!(ServiceConfig::from_value(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_construct_with_closure_factory() {
        let factory = |ctx: &ServiceContext| -> ServiceResult<FeatureSet> {
            assert_eq!(ctx.configs.get_str("section"), Some("home"));
            Ok(FeatureSet::new().with_post(MockPostFeature::new()))
        };

        let service =
            AnyService::construct(&factory, context(ServiceConfig::new().with("section", "home")))
                .unwrap();

        assert_eq!(service.id(), "me.service");
        assert!(service.supports(FeatureKind::Post));
        assert!(!service.supports(FeatureKind::User));
        assert!(service.get_feature(FeatureKind::User).is_err());
    }

    #[test]
    fn test_construct_failure_names_service() {
        let factory = |_: &ServiceContext| -> ServiceResult<FeatureSet> {
            Err(ServiceError::Config("missing api key".to_string()))
        };

        let err = AnyService::construct(&factory, context(ServiceConfig::new())).unwrap_err();
        match err {
            ServiceError::Construction { id, reason } => {
                assert_eq!(id, "me.service");
                assert!(reason.contains("missing api key"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_service_with_no_features_is_valid() {
        let factory = |_: &ServiceContext| -> ServiceResult<FeatureSet> { Ok(FeatureSet::new()) };
        let service = AnyService::construct(&factory, context(ServiceConfig::new())).unwrap();

        assert!(service.features().is_empty());
        assert!(service.features().post().is_err());
    }
}

use thiserror::Error;

use crate::features::FeatureKind;

/// Structural faults and host-side failures.
///
/// Runtime failures of a feature call (network, parse, missing remote data)
/// never use this type; they travel inside a failed `FetchResult`.
#[derive(Error, Debug)]
pub enum ServiceError {
    // Contract faults
    #[error("Not implemented yet. The {0} feature is not declared by this service")]
    FeatureNotImplemented(FeatureKind),

    #[error("Not implemented yet. Operation {0} is not provided by this service")]
    NotImplemented(&'static str),

    // Manifest errors
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Registry errors
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Service {0} has no implementation bound to it")]
    Unbound(String),

    #[error("Service {id} failed to construct: {reason}")]
    Construction { id: String, reason: String },

    #[error("Duplicate service id: {0}")]
    DuplicateId(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// True for the "Not implemented yet." family of contract faults.
    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            ServiceError::FeatureNotImplemented(_) | ServiceError::NotImplemented(_)
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

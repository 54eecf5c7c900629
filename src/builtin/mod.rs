//! Services compiled into the host.

pub mod rss;

use std::sync::Arc;

use crate::registry::{BuiltinServiceDataSource, BuiltinServicesLoader, BundledService};

/// The bundled catalog shipped with the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCatalog;

impl BuiltinServiceDataSource for BundledCatalog {
    fn get_all(&self) -> Vec<BundledService> {
        vec![BundledService::new(
            "builtin/manifests/rss.json",
            include_str!("manifests/rss.json"),
            Arc::new(rss::create),
        )]
    }
}

/// Loader over the bundled catalog.
pub fn loader() -> BuiltinServicesLoader {
    BuiltinServicesLoader::new(BundledCatalog)
}

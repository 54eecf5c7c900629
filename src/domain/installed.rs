use serde::{Deserialize, Serialize};

/// A user-installed manifest as stored by the host.
///
/// The document is kept verbatim and parsed at registry load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledService {
    pub id: String,
    pub document: String,
    pub installed_at: Option<String>,
}

impl InstalledService {
    pub fn new(id: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document: document.into(),
            installed_at: None,
        }
    }
}

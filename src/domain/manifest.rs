use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{ServiceError, ServiceResult};

fn id_pattern() -> &'static Regex {
    static ID: OnceLock<Regex> = OnceLock::new();
    ID.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("id pattern is valid")
    })
}

fn color_pattern() -> &'static Regex {
    static COLOR: OnceLock<Regex> = OnceLock::new();
    COLOR.get_or_init(|| {
        Regex::new(r"^#([0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("color pattern is valid")
    })
}

/// Identity, branding and metadata of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceManifest {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_theme_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    // Stamped by the built-in loader only; documents cannot set it.
    #[serde(skip_deserializing, default)]
    is_builtin: bool,
}

impl ServiceManifest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
            theme_color: None,
            dark_theme_color: None,
            description: None,
            version: None,
            author: None,
            homepage: None,
            is_builtin: false,
        }
    }

    /// Parse and validate a manifest document.
    pub fn parse(document: &str) -> ServiceResult<Self> {
        let manifest: ServiceManifest = serde_json::from_str(document)
            .map_err(|e| ServiceError::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read a manifest document from disk and parse it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ServiceResult<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ServiceError::ManifestRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&document)
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if !id_pattern().is_match(&self.id) {
            return Err(ServiceError::InvalidManifest(format!(
                "id '{}' must be dot-separated segments of letters, digits, '-' or '_'",
                self.id
            )));
        }

        if self.name.trim().is_empty() {
            return Err(ServiceError::InvalidManifest(format!(
                "{}: name must not be empty",
                self.id
            )));
        }

        for (field, value) in [
            ("themeColor", &self.theme_color),
            ("darkThemeColor", &self.dark_theme_color),
        ] {
            if let Some(color) = value {
                if !color_pattern().is_match(color) {
                    return Err(ServiceError::InvalidManifest(format!(
                        "{}: {} '{}' is not a #RRGGBB or #RRGGBBAA color",
                        self.id, field, color
                    )));
                }
            }
        }

        if let Some(homepage) = &self.homepage {
            Url::parse(homepage).map_err(|e| {
                ServiceError::InvalidManifest(format!("{}: homepage: {}", self.id, e))
            })?;
        }

        Ok(())
    }

    /// Stamp built-in provenance. Leaves every other field untouched.
    pub fn mark_as_builtin(self) -> Self {
        Self {
            is_builtin: true,
            ..self
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.is_builtin
    }

    pub fn provenance(&self) -> &'static str {
        if self.is_builtin {
            "builtin"
        } else {
            "installed"
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_theme_colors(mut self, light: Option<String>, dark: Option<String>) -> Self {
        self.theme_color = light;
        self.dark_theme_color = dark;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

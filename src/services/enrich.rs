use scraper::Html;
use serde::Serialize;

use crate::domain::{Post, ServiceManifest, User};

const TITLE_LENGTH: usize = 80;

/// Presentation facts a host borrows from a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub service_id: String,
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_theme_color: Option<String>,
    pub is_builtin: bool,
}

impl Branding {
    pub fn from_manifest(manifest: &ServiceManifest) -> Self {
        Self {
            service_id: manifest.id.clone(),
            service_name: manifest.name.clone(),
            icon: manifest.icon.clone(),
            theme_color: manifest.theme_color.clone(),
            // Fall back to the light colour when no dark variant is declared
            dark_theme_color: manifest
                .dark_theme_color
                .clone()
                .or_else(|| manifest.theme_color.clone()),
            is_builtin: manifest.is_builtin(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub user: User,
    pub branding: Branding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain_description: Option<String>,
}

impl UserView {
    pub fn new(user: User, manifest: &ServiceManifest) -> Self {
        let plain_description = user.description.as_deref().map(html_to_text);
        Self {
            user,
            branding: Branding::from_manifest(manifest),
            plain_description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub post: Post,
    pub branding: Branding,
    /// The post's title, or the start of its text when it has none.
    pub display_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain_content: Option<String>,
}

impl PostView {
    pub fn new(post: Post, manifest: &ServiceManifest) -> Self {
        let plain_content = post.content.as_deref().map(html_to_text);

        let display_title = match (&post.title, &plain_content) {
            (Some(title), _) if !title.trim().is_empty() => title.trim().to_string(),
            (_, Some(text)) if !text.is_empty() => truncate_for_title(text, TITLE_LENGTH),
            _ => post.url.clone(),
        };

        Self {
            post,
            branding: Branding::from_manifest(manifest),
            display_title,
            plain_content,
        }
    }
}

/// Strip markup, keeping word boundaries at block elements.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut text = String::new();

    for node in document.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            text.push_str(text_node);
        }
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "p" | "br" | "div" | "li" => text.push(' '),
                _ => {}
            }
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut at a word boundary at or before `max_len` bytes and add an ellipsis.
pub fn truncate_for_title(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    match text[..end].rfind(' ') {
        Some(pos) if pos > 0 => format!("{}...", &text[..pos]),
        _ => format!("{}...", &text[..end]),
    }
}

//! Media references
//!
//! Uploaded files as the CMS exposes them on `cover`, `avatar`,
//! `backgroundImage`, `shareImage` and the `shared.media`/`shared.slider`
//! components.

use serde::{Deserialize, Serialize};

/// A single uploaded file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub id: i64,
    /// Absolute URL or a path relative to the CMS host
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alternative_text: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub mime: Option<String>,
}

impl Media {
    /// Whether the reference points at a file at all
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Alternative text, or an empty string
    pub fn alt(&self) -> &str {
        self.alternative_text.as_deref().unwrap_or_default()
    }
}

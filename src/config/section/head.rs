//! `[head]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [head]
//! og_type = "website"
//! twitter_card = "summary_large_image"
//! exclude = ["partials"]
//!
//! [head.og_type_overrides]
//! "/blog/" = "blog"
//! "/blog/first-visit/" = "article"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::path::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TWITTER_CARDS: [&str; 4] = ["summary", "summary_large_image", "app", "player"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadSection {
    /// `og:type` for pages without an override.
    pub og_type: String,

    /// Canonical path -> `og:type`.
    pub og_type_overrides: BTreeMap<String, String>,

    pub twitter_card: String,

    /// Extra site-relative directories this pass skips.
    pub exclude: Vec<String>,
}

impl Default for HeadSection {
    fn default() -> Self {
        Self {
            og_type: "website".to_string(),
            og_type_overrides: BTreeMap::new(),
            twitter_card: "summary_large_image".to_string(),
            exclude: Vec::new(),
        }
    }
}

impl HeadSection {
    pub const OG_TYPE: FieldPath = FieldPath::new("head.og_type");
    pub const OG_TYPE_OVERRIDES: FieldPath = FieldPath::new("head.og_type_overrides");
    pub const TWITTER_CARD: FieldPath = FieldPath::new("head.twitter_card");

    /// `og:type` for a canonical path.
    pub fn og_type_for(&self, canonical: &str) -> &str {
        let canonical = normalize(canonical);
        self.og_type_overrides
            .iter()
            .find(|(path, _)| normalize(path) == canonical)
            .map_or(self.og_type.as_str(), |(_, ty)| ty.as_str())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.og_type.trim().is_empty() {
            diag.error(Self::OG_TYPE, "og_type must not be empty");
        }
        for (path, ty) in &self.og_type_overrides {
            if !path.starts_with('/') {
                diag.error(
                    Self::OG_TYPE_OVERRIDES,
                    format!("override key `{path}` must be a root-relative canonical path"),
                );
            }
            if ty.trim().is_empty() {
                diag.error(Self::OG_TYPE_OVERRIDES, format!("empty og:type for `{path}`"));
            }
        }
        if !TWITTER_CARDS.contains(&self.twitter_card.as_str()) {
            diag.error_with_hint(
                Self::TWITTER_CARD,
                format!("unknown twitter card `{}`", self.twitter_card),
                format!("use one of: {}", TWITTER_CARDS.join(", ")),
            );
        }
    }
}

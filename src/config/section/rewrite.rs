//! `[rewrite]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [rewrite]
//! asset_prefixes = ["images/", "styles/", "scripts/", "fonts/"]
//! data_attributes = ["data-src", "data-bg"]   # Rewritten like href/src
//! exclude = ["legacy-landing"]                # Skipped by this pass only
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteSection {
    /// Path prefixes that name static assets rather than pages.
    pub asset_prefixes: Vec<String>,

    /// `data-*` attributes carrying URLs.
    pub data_attributes: Vec<String>,

    /// Extra site-relative directories this pass skips.
    pub exclude: Vec<String>,
}

impl Default for RewriteSection {
    fn default() -> Self {
        Self {
            asset_prefixes: ["images/", "styles/", "scripts/"]
                .map(String::from)
                .to_vec(),
            data_attributes: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl RewriteSection {
    pub const ASSET_PREFIXES: FieldPath = FieldPath::new("rewrite.asset_prefixes");
    pub const DATA_ATTRIBUTES: FieldPath = FieldPath::new("rewrite.data_attributes");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for attr in &self.data_attributes {
            if !attr.to_ascii_lowercase().starts_with("data-") {
                diag.error_with_hint(
                    Self::DATA_ATTRIBUTES,
                    format!("`{attr}` is not a data-* attribute"),
                    "href, src and srcset are always rewritten",
                );
            }
        }
        for prefix in &self.asset_prefixes {
            if prefix.trim_matches('/').is_empty() {
                diag.error(Self::ASSET_PREFIXES, "empty asset prefix would match every path");
            } else if !prefix.ends_with('/') {
                diag.warn(
                    Self::ASSET_PREFIXES,
                    format!("`{prefix}` has no trailing slash and also matches `{prefix}-*` paths"),
                );
            }
        }
    }

    /// Asset prefixes without a leading slash, as matched against lookup keys.
    pub fn prefixes(&self) -> Vec<String> {
        self.asset_prefixes
            .iter()
            .map(|p| p.trim_start_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

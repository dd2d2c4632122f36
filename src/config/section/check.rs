//! `[check]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [check]
//! legacy_prefix = "pages/"               # hrefs into this namespace are violations
//! deploy_config = "vercel.json"          # Deploy platform redirects ("" to disable)
//! top_urls = "analytics/top-urls.csv"    # CSV with a path column, or one path per line
//! top_urls_column = "current_path"
//! redirects = "redirects.csv"            # Declared redirects: from_path,to_path
//! required_files = ["sitemap.xml", "robots.txt", "favicon.ico"]
//! exclude = ["drafts"]
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSection {
    /// Extra site-relative directories this pass skips.
    pub exclude: Vec<String>,

    /// Site-relative prefix of the legacy source namespace.
    pub legacy_prefix: String,

    /// Deploy platform config holding `redirects`.
    pub deploy_config: PathBuf,

    pub top_urls: Option<PathBuf>,

    /// Column read from a CSV `top_urls` file.
    pub top_urls_column: String,

    /// Declared redirect list.
    pub redirects: Option<PathBuf>,

    /// Site-relative files that must exist.
    pub required_files: Vec<String>,
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            legacy_prefix: "pages/".to_string(),
            deploy_config: PathBuf::from("vercel.json"),
            top_urls: None,
            top_urls_column: "current_path".to_string(),
            redirects: None,
            required_files: vec!["sitemap.xml".to_string()],
        }
    }
}

impl CheckSection {
    pub const LEGACY_PREFIX: FieldPath = FieldPath::new("check.legacy_prefix");
    pub const TOP_URLS_COLUMN: FieldPath = FieldPath::new("check.top_urls_column");

    /// Deploy config path, or `None` when disabled.
    pub fn deploy_config(&self) -> Option<&Path> {
        (!self.deploy_config.as_os_str().is_empty()).then_some(self.deploy_config.as_path())
    }

    /// Legacy prefix without a leading slash.
    pub fn legacy_prefix(&self) -> &str {
        self.legacy_prefix.trim_start_matches('/')
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.legacy_prefix().is_empty() {
            diag.error(Self::LEGACY_PREFIX, "legacy prefix would match every link");
        }
        if self.top_urls.is_some() && self.top_urls_column.trim().is_empty() {
            diag.error(Self::TOP_URLS_COLUMN, "column name must not be empty");
        }
    }
}

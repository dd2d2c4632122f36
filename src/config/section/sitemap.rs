//! `[sitemap]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [sitemap]
//! path = "sitemap.xml"                   # Output, relative to the site root
//! exclude = ["pages", "images"]          # Source-only directories
//! exclude_urls = [
//!     "/miboflo/",                       # Canonical paths...
//!     "pages/dry-eye/miboflo.html",      # ...or source paths, resolved through the route table
//! ]
//! minify = false
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapSection {
    pub path: PathBuf,

    /// Extra site-relative directories with no sitemap entries.
    pub exclude: Vec<String>,

    /// Legacy URLs that permanently redirect elsewhere.
    pub exclude_urls: Vec<String>,

    /// Write the XML on a single line.
    pub minify: bool,
}

impl Default for SitemapSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sitemap.xml"),
            exclude: Vec::new(),
            exclude_urls: Vec::new(),
            minify: false,
        }
    }
}

impl SitemapSection {
    pub const PATH: FieldPath = FieldPath::new("sitemap.path");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.path.as_os_str().is_empty() {
            diag.error(Self::PATH, "sitemap path must not be empty");
        } else if self.path.is_absolute() {
            diag.warn(
                Self::PATH,
                format!("`{}` is outside the site root", self.path.display()),
            );
        }
    }
}

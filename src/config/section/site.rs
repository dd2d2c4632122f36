//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! origin = "https://example.com"                     # Canonical origin (required)
//! internal_hosts = ["www.example.com", "cdn.example.net"]  # Also treated as this site
//! exclude = ["node_modules", "api", "partials"]      # Never processed by any pass
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Scheme and host every canonical URL starts with.
    pub origin: String,

    /// Legacy hosts (old domains, CDN mirrors) whose absolute URLs are internal.
    pub internal_hosts: Vec<String>,

    /// Site-relative directories skipped by every pass.
    pub exclude: Vec<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            origin: String::new(),
            internal_hosts: Vec::new(),
            exclude: vec!["node_modules".to_string()],
        }
    }
}

impl SiteSection {
    pub const ORIGIN: FieldPath = FieldPath::new("site.origin");
    pub const INTERNAL_HOSTS: FieldPath = FieldPath::new("site.internal_hosts");

    /// Origin without a trailing slash, ready for `origin + path`.
    pub fn origin(&self) -> &str {
        self.origin.trim_end_matches('/')
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.origin.trim().is_empty() {
            diag.error_with_hint(
                Self::ORIGIN,
                "origin is required",
                "set `origin = \"https://example.com\"` under [site]",
            );
            return;
        }

        match Url::parse(&self.origin) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                diag.error(
                    Self::ORIGIN,
                    format!("origin must use http or https, got `{}`", url.scheme()),
                );
            }
            Ok(url) if url.host_str().is_none() => {
                diag.error(Self::ORIGIN, "origin has no host");
            }
            Ok(url) => {
                if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
                    diag.error_with_hint(
                        Self::ORIGIN,
                        format!("origin `{}` must not carry a path, query or fragment", self.origin),
                        "routes are root-relative; put the path into each canonical instead",
                    );
                }
            }
            Err(err) => diag.error(Self::ORIGIN, format!("invalid origin `{}`: {err}", self.origin)),
        }

        for host in &self.internal_hosts {
            if host.contains('/') || host.contains(':') {
                diag.error_with_hint(
                    Self::INTERNAL_HOSTS,
                    format!("`{host}` is not a bare host name"),
                    "list hosts only, e.g. `cdn.example.net`",
                );
            }
        }
    }
}

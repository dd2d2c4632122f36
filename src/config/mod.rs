//! Site configuration management for `reroute.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One module per TOML section
//! ├── types/         # ConfigError, diagnostics, field paths
//! ├── util.rs        # Config file discovery
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section       | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `[site]`      | Origin, internal hosts, excluded directories     |
//! | `[[route]]`   | Source path -> canonical path table              |
//! | `[rewrite]`   | Asset prefixes, data-* attributes                |
//! | `[head]`      | og:type, twitter card                            |
//! | `[sitemap]`   | Output path, exclusions                          |
//! | `[check]`     | Legacy prefix, deploy config, manifests          |
//!
//! The configuration is loaded once, validated, and then only borrowed.

pub mod section;
pub mod types;
mod util;

pub use section::{
    CheckSection, HeadSection, RewriteSection, RouteEntry, SiteSection, SitemapSection,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::Cli;
use crate::core::{InternalHosts, RouteMap, SiteTree};
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing reroute.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site root - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    /// Route table, in declaration order
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteEntry>,

    #[serde(default)]
    pub rewrite: RewriteSection,

    #[serde(default)]
    pub head: HeadSection,

    #[serde(default)]
    pub sitemap: SitemapSection,

    #[serde(default)]
    pub check: CheckSection,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd; the directory holding the file is the site root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::Missing(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;
        config.config_path = config_path;
        config.finalize(cli);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content).map_err(ConfigError::from)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve the root and apply CLI overrides.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.root = root.canonicalize().unwrap_or(root);

        Self::update_option(&mut self.site.origin, cli.origin.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.site.validate(&mut diag);
        section::validate_routes(&self.routes, &mut diag);
        self.rewrite.validate(&mut diag);
        self.head.validate(&mut diag);
        self.sitemap.validate(&mut diag);
        self.check.validate(&mut diag);

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    // ========================================================================
    // derived views
    // ========================================================================

    /// Build the route table. Validation has already rejected conflicts.
    pub fn route_map(&self) -> Result<RouteMap> {
        RouteMap::new(self.routes.iter().map(|r| (&r.source, &r.canonical)))
            .map_err(|err| ConfigError::Validation(err.to_string()))
            .context("failed to build route table")
    }

    /// Origin host plus configured aliases.
    pub fn internal_hosts(&self) -> InternalHosts {
        InternalHosts::new(
            self.site.origin(),
            self.site.internal_hosts.iter().map(String::as_str),
        )
    }

    /// Site tree honoring `[site] exclude` plus a pass's own exclusions.
    pub fn tree(&self, extra_exclude: &[String]) -> SiteTree {
        SiteTree::new(&self.root, self.site.exclude.iter().cloned()).excluding(extra_exclude)
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }
}

// ============================================================================
// test helpers
// ============================================================================

/// Parse a config with a valid `[site]` table followed by `extra`.
///
/// `extra` lines without their own table header land in `[site]`.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let content = format!("[site]\norigin = \"https://example.com\"\n{extra}");
    let (config, ignored) = SiteConfig::parse_with_ignored(&content).unwrap();
    assert!(ignored.is_empty(), "unexpected unknown fields: {ignored:?}");
    config
}

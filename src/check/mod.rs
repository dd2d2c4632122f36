//! Read-only consistency checks.
//!
//! Cross-validates the route table, the redirect manifests and the file tree:
//!
//! | check                 | violation when                                          |
//! |-----------------------|---------------------------------------------------------|
//! | required files        | a `[check] required_files` entry is missing             |
//! | top URLs              | a top URL has no file and is not a deployed redirect    |
//! | redirect destinations | a local destination has no file                         |
//! | deployed redirects    | a declared pair is absent from the deploy config        |
//! | route files           | a canonical route has no `index.html`                   |
//! | canonical tag         | a page has no `<link rel="canonical">`                  |
//! | legacy links          | a page links into the legacy source namespace           |
//!
//! Manifests are loaded up front by [`Manifests::load`]; a missing or
//! unparsable one aborts the run before any page is read.

mod manifest;
mod report;

pub use manifest::{
    ManifestError, Redirect, load_declared_redirects, load_deploy_redirects, load_top_urls,
};
pub use report::{CheckKind, CheckReport, Violation};

use crate::config::SiteConfig;
use crate::core::{InternalHosts, LinkKind, RouteMap, SiteTree, collapse_relative, split_suffix};
use crate::debug;
use crate::pipeline::scan::tags;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::fs;
use url::Url;

// ============================================================================
// Inputs
// ============================================================================

/// External manifests, loaded before any page is read.
#[derive(Debug, Default)]
pub struct Manifests {
    pub top_urls: Vec<String>,
    pub declared: Vec<Redirect>,
    /// `None` when the deploy config is disabled or absent.
    pub deployed: Option<Vec<Redirect>>,
}

impl Manifests {
    pub fn load(config: &SiteConfig) -> Result<Self, ManifestError> {
        let check = &config.check;

        let top_urls = match &check.top_urls {
            Some(path) => load_top_urls(&config.root_join(path), &check.top_urls_column)?,
            None => Vec::new(),
        };
        let declared = match &check.redirects {
            Some(path) => load_declared_redirects(&config.root_join(path))?,
            None => Vec::new(),
        };
        let deployed = match check.deploy_config() {
            Some(path) => load_deploy_redirects(&config.root_join(path))?,
            None => None,
        };

        Ok(Self {
            top_urls,
            declared,
            deployed,
        })
    }

    fn deployed(&self) -> &[Redirect] {
        self.deployed.as_deref().unwrap_or_default()
    }
}

// ============================================================================
// Checker
// ============================================================================

pub struct Checker<'a> {
    routes: &'a RouteMap,
    hosts: &'a InternalHosts,
    tree: SiteTree,
    legacy_prefix: &'a str,
    required_files: &'a [String],
}

impl<'a> Checker<'a> {
    pub fn new(
        routes: &'a RouteMap,
        hosts: &'a InternalHosts,
        tree: SiteTree,
        legacy_prefix: &'a str,
    ) -> Self {
        Self {
            routes,
            hosts,
            tree,
            legacy_prefix,
            required_files: &[],
        }
    }

    pub fn with_required_files(mut self, files: &'a [String]) -> Self {
        self.required_files = files;
        self
    }

    /// Checker for a loaded configuration.
    pub fn from_config(config: &'a SiteConfig, routes: &'a RouteMap, hosts: &'a InternalHosts) -> Self {
        Self::new(
            routes,
            hosts,
            config.tree(&config.check.exclude),
            config.check.legacy_prefix(),
        )
        .with_required_files(&config.check.required_files)
    }

    /// Run every check over pages in `files` (site-relative, sorted).
    pub fn check(&self, manifests: &Manifests, files: &[String]) -> CheckReport {
        let mut report = CheckReport::default();

        self.check_required_files(&mut report);
        self.check_top_urls(manifests, &mut report);
        self.check_redirect_destinations(manifests, &mut report);
        self.check_deployed_redirects(manifests, &mut report);
        self.check_route_files(&mut report);
        self.check_pages(files, &mut report);

        report.sort();
        report
    }

    /// Run every check over all pages outside the excluded directories.
    pub fn check_site(&self, manifests: &Manifests) -> CheckReport {
        self.check(manifests, &self.tree.html_files())
    }

    fn check_required_files(&self, report: &mut CheckReport) {
        for file in self.required_files {
            if !self.tree.file_exists(file) {
                report.push(CheckKind::RequiredFile, file.as_str());
            }
        }
    }

    fn check_top_urls(&self, manifests: &Manifests, report: &mut CheckReport) {
        let sources: FxHashSet<&str> = manifests
            .deployed()
            .iter()
            .map(|r| r.source.as_str())
            .collect();

        for url in &manifests.top_urls {
            let path = url_path(url);
            if self.tree.route_exists(&path) || sources.contains(path.as_str()) {
                continue;
            }
            report.push(CheckKind::TopUrl, url.as_str());
        }
    }

    fn check_redirect_destinations(&self, manifests: &Manifests, report: &mut CheckReport) {
        let mut seen = FxHashSet::default();
        let destinations = manifests
            .declared
            .iter()
            .chain(manifests.deployed())
            .map(|r| r.destination.as_str());

        for destination in destinations {
            if !is_local_destination(destination) || !seen.insert(destination) {
                continue;
            }
            if !self.tree.route_exists(destination) {
                report.push(CheckKind::RedirectDestination, destination);
            }
        }
    }

    fn check_deployed_redirects(&self, manifests: &Manifests, report: &mut CheckReport) {
        if manifests.declared.is_empty() {
            return;
        }
        let deployed: FxHashSet<&Redirect> = manifests.deployed().iter().collect();
        for redirect in &manifests.declared {
            if !deployed.contains(redirect) {
                report.push(
                    CheckKind::DeployRedirect,
                    format!("{} -> {}", redirect.source, redirect.destination),
                );
            }
        }
    }

    fn check_route_files(&self, report: &mut CheckReport) {
        for canonical in self.routes.canonicals() {
            if !self.tree.route_exists(canonical) {
                report.push(CheckKind::RouteFile, canonical);
            }
        }
    }

    /// Canonical tags and legacy links, one page per worker.
    fn check_pages(&self, files: &[String], report: &mut CheckReport) {
        let findings: Vec<Vec<Violation>> = files
            .par_iter()
            .map(|rel| match fs::read_to_string(self.tree.abs(rel)) {
                Ok(html) => self.check_page(rel, &html),
                Err(err) => {
                    debug!("check"; "cannot read {rel}: {err}");
                    vec![Violation::new(CheckKind::ReadablePage, format!("{rel}: {err}"))]
                }
            })
            .collect();

        report.pages += files.len();
        report.violations.extend(findings.into_iter().flatten());
    }

    fn check_page(&self, rel: &str, html: &str) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut has_canonical = false;

        for tag in tags(html).filter(|t| !t.closing) {
            if tag.is_canonical_link() {
                has_canonical = true;
            }
            let Some(href) = tag.attr_value("href") else {
                continue;
            };
            if self.is_legacy(href.trim()) {
                violations.push(Violation::new(
                    CheckKind::LegacyLink,
                    format!("{rel} -> {}", href.trim()),
                ));
            }
        }

        if !has_canonical {
            violations.insert(0, Violation::new(CheckKind::Canonical, rel));
        }
        violations
    }

    /// Whether an href points into the legacy source namespace.
    fn is_legacy(&self, href: &str) -> bool {
        let path = match LinkKind::classify(href, self.hosts) {
            LinkKind::InternalRelative(path) => path.to_string(),
            LinkKind::InternalAbsolute(local) => local,
            _ => return false,
        };
        let (path, _) = split_suffix(&path);
        collapse_relative(path).starts_with(self.legacy_prefix)
    }
}

/// Path of a top URL, which may be absolute or root-relative.
fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => {
            let (path, _) = split_suffix(url.trim());
            if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{path}")
            }
        }
    }
}

/// Root-relative destination without route patterns.
fn is_local_destination(destination: &str) -> bool {
    destination.starts_with('/')
        && !destination.starts_with("//")
        && !destination.contains([':', '*', '(', '$'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    const CANONICAL: &str = r#"<link rel="canonical" href="https://example.com/x/">"#;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn routes() -> RouteMap {
        RouteMap::new([
            ("pages/about/index.html", "/about-us/"),
            ("pages/about.html", "/about-us/"),
            ("pages/patients/book.html", "/book-now/"),
        ])
        .unwrap()
    }

    fn hosts() -> InternalHosts {
        InternalHosts::new("https://example.com", ["cdn.example.net"])
    }

    /// A clean site: every route has a file, every page a canonical tag.
    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let page = format!("<head>{CANONICAL}</head><a href=\"/about-us/\">about</a>");
        write(dir.path(), "index.html", &page);
        write(dir.path(), "about-us/index.html", &page);
        write(dir.path(), "book-now/index.html", &page);
        write(dir.path(), "pages/about/index.html", "<p>legacy source</p>");
        write(dir.path(), "sitemap.xml", "<urlset/>");
        dir
    }

    fn run(dir: &TempDir, manifests: &Manifests) -> CheckReport {
        let routes = routes();
        let hosts = hosts();
        let required = vec!["sitemap.xml".to_string()];
        Checker::new(
            &routes,
            &hosts,
            SiteTree::new(dir.path(), ["pages".to_string()]),
            "pages/",
        )
        .with_required_files(&required)
        .check_site(manifests)
    }

    fn subjects(report: &CheckReport, kind: CheckKind) -> Vec<String> {
        report.of_kind(kind).map(|v| v.subject.clone()).collect()
    }

    #[test]
    fn test_clean_site_passes() {
        let dir = site();
        let report = run(&dir, &Manifests::default());
        assert!(report.ok(), "{:?}", report.violations);
        assert_eq!(report.pages, 3);
    }

    #[test]
    fn test_missing_canonical_and_legacy_links() {
        let dir = site();
        write(
            dir.path(),
            "book-now/index.html",
            r#"<head></head>
<a href="../pages/patients/book.html">a</a>
<a href="https://example.com/pages/about.html#team">b</a>
<a href="https://other.example/pages/x.html">c</a>
<a href="mailto:pages@example.com">d</a>"#,
        );
        let report = run(&dir, &Manifests::default());

        assert_eq!(subjects(&report, CheckKind::Canonical), vec!["book-now/index.html"]);
        assert_eq!(
            subjects(&report, CheckKind::LegacyLink),
            vec![
                "book-now/index.html -> ../pages/patients/book.html",
                "book-now/index.html -> https://example.com/pages/about.html#team",
            ]
        );
    }

    #[test]
    fn test_required_files_and_route_files() {
        let dir = site();
        fs::remove_file(dir.path().join("sitemap.xml")).unwrap();
        fs::remove_dir_all(dir.path().join("book-now")).unwrap();

        let report = run(&dir, &Manifests::default());
        assert_eq!(subjects(&report, CheckKind::RequiredFile), vec!["sitemap.xml"]);
        assert_eq!(subjects(&report, CheckKind::RouteFile), vec!["/book-now/"]);
    }

    #[test]
    fn test_top_urls_covered_by_file_or_redirect() {
        let dir = site();
        let manifests = Manifests {
            top_urls: vec![
                "/".into(),
                "https://example.com/about-us/?utm=x".into(),
                "/old-services/".into(),
                "/gone/".into(),
            ],
            deployed: Some(vec![Redirect::new("/old-services/", "/about-us/")]),
            ..Manifests::default()
        };
        let report = run(&dir, &manifests);
        assert_eq!(subjects(&report, CheckKind::TopUrl), vec!["/gone/"]);
    }

    #[test]
    fn test_redirect_destinations_and_deployment() {
        let dir = site();
        let manifests = Manifests {
            declared: vec![
                Redirect::new("/pages/about/index.html", "/about-us/"),
                Redirect::new("/specials/", "/missing/"),
            ],
            deployed: Some(vec![
                Redirect::new("/pages/about/index.html", "/about-us/"),
                Redirect::new("/blog/:slug", "/blog/:slug/"),
                Redirect::new("/shop/", "https://shop.example.com/"),
            ]),
            ..Manifests::default()
        };
        let report = run(&dir, &manifests);

        assert_eq!(
            subjects(&report, CheckKind::RedirectDestination),
            vec!["/missing/"]
        );
        assert_eq!(
            subjects(&report, CheckKind::DeployRedirect),
            vec!["/specials/ -> /missing/"]
        );
    }

    #[test]
    fn test_declared_redirects_without_deploy_config() {
        let dir = site();
        let manifests = Manifests {
            declared: vec![Redirect::new("/a/", "/about-us/")],
            deployed: None,
            ..Manifests::default()
        };
        let report = run(&dir, &manifests);
        assert_eq!(subjects(&report, CheckKind::DeployRedirect), vec!["/a/ -> /about-us/"]);
    }

    #[test]
    fn test_manifests_load_from_config() {
        let dir = site();
        write(dir.path(), "vercel.json", r#"{"redirects": []}"#);
        write(dir.path(), "data/top.csv", "current_path\n/\n");
        let mut config = crate::config::test_parse_config("[check]\ntop_urls = \"data/top.csv\"");
        config.root = dir.path().to_path_buf();

        let manifests = Manifests::load(&config).unwrap();
        assert_eq!(manifests.top_urls, vec!["/"]);
        assert_eq!(manifests.deployed, Some(vec![]));
    }

    #[test]
    fn test_manifests_missing_configured_file_is_fatal() {
        let dir = site();
        let mut config = crate::config::test_parse_config("[check]\nredirects = \"nope.csv\"");
        config.root = dir.path().to_path_buf();
        assert!(matches!(Manifests::load(&config), Err(ManifestError::Read(..))));
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path("https://example.com/a/?q=1"), "/a/");
        assert_eq!(url_path("/b/#x"), "/b/");
        assert_eq!(url_path("c/"), "/c/");
    }
}

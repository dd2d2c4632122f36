//! Sitemap generation.
//!
//! Lists every route-bearing `index.html` for search engine indexing.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```
//!
//! `lastmod` is the date of the last commit touching the file, falling back
//! to the file's mtime in UTC.

use crate::config::SiteConfig;
use crate::core::{RouteMap, SiteTree, path::normalize};
use crate::generator::minify_xml;
use crate::utils::date::DateTimeUtc;
use crate::utils::git::GitHistory;
use crate::{debug, log};
use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// What a sitemap run produced.
#[derive(Debug)]
pub struct SitemapOutcome {
    pub path: PathBuf,
    pub entries: usize,
    /// Entries dated from version history rather than mtime.
    pub from_history: usize,
    pub written: bool,
}

/// Build the sitemap and write it unless `dry`.
pub fn build_sitemap(config: &SiteConfig, routes: &RouteMap, dry: bool) -> Result<SitemapOutcome> {
    let tree = config.tree(&config.sitemap.exclude);
    let candidates = candidates(&tree);

    let history = match GitHistory::discover(&config.root) {
        Some(git) => git.last_commit_dates(&candidates).unwrap_or_else(|err| {
            log!("warning"; "git history unavailable, using mtime: {err:#}");
            FxHashMap::default()
        }),
        None => {
            debug!("sitemap"; "no repository at {}, using mtime", config.root.display());
            FxHashMap::default()
        }
    };

    let sitemap = Sitemap::build(
        &tree,
        &candidates,
        routes,
        &config.sitemap.exclude_urls,
        config.site.origin(),
        &history,
    );
    let entries = sitemap.urls.len();
    let from_history = candidates.iter().filter(|c| history.contains_key(*c)).count();

    let path = config.root_join(&config.sitemap.path);
    if !dry {
        let xml = sitemap.into_xml();
        let xml = minify_xml(&xml, config.sitemap.minify);
        fs::write(&path, xml.as_bytes())
            .with_context(|| format!("failed to write sitemap to {}", path.display()))?;
    }

    Ok(SitemapOutcome {
        path,
        entries,
        from_history,
        written: !dry,
    })
}

/// Root `index.html` plus every nested `index.html`, sorted.
fn candidates(tree: &SiteTree) -> Vec<String> {
    tree.html_files()
        .into_iter()
        .filter(|rel| rel == "index.html" || rel.ends_with("/index.html"))
        .collect()
}

struct Sitemap {
    urls: Vec<UrlEntry>,
}

#[derive(Debug, PartialEq, Eq)]
struct UrlEntry {
    loc: String,
    lastmod: Option<String>,
}

impl Sitemap {
    /// Entries in candidate order; excluded and duplicate routes dropped.
    fn build(
        tree: &SiteTree,
        candidates: &[String],
        routes: &RouteMap,
        exclude_urls: &[String],
        origin: &str,
        history: &FxHashMap<String, DateTimeUtc>,
    ) -> Self {
        let excluded: FxHashSet<String> = exclude_urls
            .iter()
            .map(|url| normalize(&routes.resolve(url)))
            .collect();
        let mut seen = FxHashSet::default();

        let urls = candidates
            .iter()
            .filter_map(|rel| {
                let route = routes.canonical_for_file(rel);
                if excluded.contains(&route) {
                    debug!("sitemap"; "excluded {route}");
                    return None;
                }
                if !seen.insert(route.clone()) {
                    return None;
                }
                let lastmod = history
                    .get(rel)
                    .copied()
                    .or_else(|| mtime(tree, rel))
                    .map(DateTimeUtc::to_date_string);
                Some(UrlEntry {
                    loc: format!("{origin}{route}"),
                    lastmod,
                })
            })
            .collect();

        Self { urls }
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&lastmod);
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

fn mtime(tree: &SiteTree, rel: &str) -> Option<DateTimeUtc> {
    let modified = fs::metadata(tree.abs(rel)).ok()?.modified().ok()?;
    DateTimeUtc::from_system_time(modified)
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html></html>").unwrap();
    }

    fn routes() -> RouteMap {
        RouteMap::new([
            ("pages/about/index.html", "/about-us/"),
            (
                "pages/dry-eye/treatments/miboflo.html",
                "/dry-eye-treatment-miboflo/",
            ),
        ])
        .unwrap()
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        for rel in [
            "index.html",
            "about-us/index.html",
            "dry-eye-treatment-miboflo/index.html",
            "pages/about/index.html",
            "pages/dry-eye/treatments/miboflo.html",
            "contact.html",
        ] {
            touch(dir.path(), rel);
        }
        dir
    }

    fn build(dir: &TempDir, exclude_urls: &[&str]) -> Sitemap {
        let tree = SiteTree::new(dir.path(), ["pages".to_string()]);
        let exclude_urls: Vec<String> = exclude_urls.iter().map(|s| s.to_string()).collect();
        Sitemap::build(
            &tree,
            &candidates(&tree),
            &routes(),
            &exclude_urls,
            "https://example.com",
            &FxHashMap::default(),
        )
    }

    fn locs(sitemap: &Sitemap) -> Vec<&str> {
        sitemap.urls.iter().map(|u| u.loc.as_str()).collect()
    }

    #[test]
    fn test_candidates_are_index_files_outside_excluded_dirs() {
        let dir = site();
        let tree = SiteTree::new(dir.path(), ["pages".to_string()]);
        assert_eq!(
            candidates(&tree),
            vec![
                "about-us/index.html",
                "dry-eye-treatment-miboflo/index.html",
                "index.html",
            ]
        );
    }

    #[test]
    fn test_entries_sorted_by_file_path() {
        let dir = site();
        assert_eq!(
            locs(&build(&dir, &[])),
            vec![
                "https://example.com/about-us/",
                "https://example.com/dry-eye-treatment-miboflo/",
                "https://example.com/",
            ]
        );
    }

    #[test]
    fn test_legacy_source_exclusion() {
        let dir = site();
        let sitemap = build(&dir, &["pages/dry-eye/treatments/miboflo.html"]);
        let xml = sitemap.into_xml();
        assert!(!xml.contains("miboflo"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[test]
    fn test_canonical_exclusion_is_normalized() {
        let dir = site();
        let sitemap = build(&dir, &["about-us"]);
        assert!(!locs(&sitemap).contains(&"https://example.com/about-us/"));
    }

    #[test]
    fn test_lastmod_prefers_history() {
        let dir = site();
        let tree = SiteTree::new(dir.path(), ["pages".to_string()]);
        let mut history = FxHashMap::default();
        history.insert(
            "index.html".to_string(),
            DateTimeUtc::new(2024, 3, 9, 23, 59, 0),
        );

        let sitemap = Sitemap::build(
            &tree,
            &["index.html".to_string()],
            &routes(),
            &[],
            "https://example.com",
            &history,
        );
        assert_eq!(sitemap.urls[0].lastmod.as_deref(), Some("2024-03-09"));
    }

    #[test]
    fn test_lastmod_falls_back_to_mtime() {
        let dir = site();
        let sitemap = build(&dir, &[]);
        let lastmod = sitemap.urls[0].lastmod.as_deref().unwrap();
        assert_eq!(lastmod.len(), 10);
        assert_eq!(&lastmod[4..5], "-");
        assert_eq!(&lastmod[7..8], "-");
    }

    #[test]
    fn test_duplicate_routes_collapse() {
        let dir = site();
        let tree = SiteTree::new(dir.path(), Vec::<String>::new());
        let sitemap = Sitemap::build(
            &tree,
            &["about-us/index.html".to_string(), "pages/about/index.html".to_string()],
            &routes(),
            &[],
            "https://example.com",
            &FxHashMap::default(),
        );
        assert_eq!(locs(&sitemap), vec!["https://example.com/about-us/"]);
    }

    #[test]
    fn test_build_sitemap_writes_file() {
        let dir = site();
        let mut config = test_parse_config("exclude = [\"pages\"]\n[sitemap]\nminify = true");
        config.root = dir.path().to_path_buf();

        let outcome = build_sitemap(&config, &routes(), false).unwrap();
        assert!(outcome.written);
        assert_eq!(outcome.entries, 3);

        let xml = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><urlset"#));
        assert!(xml.contains("<loc>https://example.com/about-us/</loc>"));
    }

    #[test]
    fn test_build_sitemap_dry_run() {
        let dir = site();
        let mut config = test_parse_config("");
        config.root = dir.path().to_path_buf();

        let outcome = build_sitemap(&config, &routes(), true).unwrap();
        assert!(!outcome.written);
        assert!(!dir.path().join("sitemap.xml").exists());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn test_sitemap_xml_structure() {
        let sitemap = Sitemap {
            urls: vec![
                UrlEntry {
                    loc: "https://example.com/search?q=a&b=c".to_string(),
                    lastmod: None,
                },
                UrlEntry {
                    loc: "https://example.com/".to_string(),
                    lastmod: Some("2025-01-01".to_string()),
                },
            ],
        };
        let xml = sitemap.into_xml();

        let lines: Vec<&str> = xml.lines().collect();
        assert_eq!(lines[0], r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        assert_eq!(lines[1], format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        assert_eq!(lines.last().copied(), Some("</urlset>"));
        assert!(xml.contains("<loc>https://example.com/search?q=a&amp;b=c</loc>"));
        assert_eq!(xml.matches("<lastmod>").count(), 1);
    }
}

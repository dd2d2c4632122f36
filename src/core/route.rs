//! The route table: legacy source paths and the canonical paths that replace them.
//!
//! Built once from configuration and shared read-only by every pass, so the
//! link rewriter, head writer, sitemap and checker agree on each page's URL.

use super::path::{normalize, served_path};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// One legacy source path and its canonical served path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMapping {
    /// Repository-relative file path, e.g. `pages/about.html`.
    pub source: String,
    /// Normalized served path, e.g. `/about-us/`.
    pub canonical: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("source `{path}` maps to both `{first}` and `{second}`")]
    ConflictingSource {
        path: String,
        first: String,
        second: String,
    },
    #[error("route source is empty")]
    EmptySource,
}

/// Bidirectional lookup over route mappings.
///
/// Each source maps to exactly one canonical path; a canonical path may be
/// reached from several sources (aliases).
#[derive(Debug, Default, Clone)]
pub struct RouteMap {
    mappings: Vec<RouteMapping>,
    by_source: FxHashMap<String, usize>,
    by_canonical: FxHashMap<String, Vec<usize>>,
}

impl RouteMap {
    /// Build from `(source, canonical)` pairs in declaration order.
    ///
    /// Canonical paths are normalized; repeating a pair is harmless, mapping
    /// one source to two canonicals is an error.
    pub fn new<I, S, C>(pairs: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = (S, C)>,
        S: AsRef<str>,
        C: AsRef<str>,
    {
        let mut map = Self::default();

        for (source, canonical) in pairs {
            let source = source_key(source.as_ref()).to_string();
            if source.is_empty() {
                return Err(RouteError::EmptySource);
            }
            let canonical = normalize(canonical.as_ref());

            if let Some(&idx) = map.by_source.get(&source) {
                let existing = &map.mappings[idx].canonical;
                if *existing == canonical {
                    continue;
                }
                return Err(RouteError::ConflictingSource {
                    path: source,
                    first: existing.clone(),
                    second: canonical,
                });
            }

            let idx = map.mappings.len();
            map.by_source.insert(source.clone(), idx);
            map.by_canonical
                .entry(canonical.clone())
                .or_default()
                .push(idx);
            map.mappings.push(RouteMapping { source, canonical });
        }

        Ok(map)
    }

    /// Canonical path for a mapped source, if any.
    pub fn lookup(&self, source: &str) -> Option<&str> {
        self.by_source
            .get(source_key(source))
            .map(|&idx| self.mappings[idx].canonical.as_str())
    }

    /// Canonical path for `source`, or its normalized form when unmapped.
    pub fn resolve(&self, source: &str) -> String {
        self.lookup(source)
            .map_or_else(|| normalize(source), str::to_string)
    }

    /// Canonical path a site-relative file is served at.
    ///
    /// Mapped files take their canonical; others their natural served path.
    pub fn canonical_for_file(&self, rel: &str) -> String {
        self.lookup(rel)
            .map_or_else(|| served_path(rel), str::to_string)
    }

    /// Sources that map to `canonical`, in declaration order.
    pub fn sources_for(&self, canonical: &str) -> Vec<&str> {
        self.by_canonical
            .get(&normalize(canonical))
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| self.mappings[i].source.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `path` is the canonical of some mapping.
    pub fn is_canonical(&self, path: &str) -> bool {
        self.by_canonical.contains_key(&normalize(path))
    }

    /// Distinct canonical paths in first-declared order.
    pub fn canonicals(&self) -> impl Iterator<Item = &str> {
        self.mappings
            .iter()
            .enumerate()
            .filter(|(i, m)| self.by_canonical[&m.canonical].first() == Some(i))
            .map(|(_, m)| m.canonical.as_str())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Lookup key for a source path: no leading `/` or `./`.
fn source_key(source: &str) -> &str {
    let mut key = source.trim();
    loop {
        if let Some(rest) = key.strip_prefix("./") {
            key = rest;
        } else if let Some(rest) = key.strip_prefix('/') {
            key = rest;
        } else {
            return key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RouteMap {
        RouteMap::new([
            ("index.html", "/"),
            ("pages/about.html", "about-us"),
            ("pages/services-eye-care.html", "/eye-care-services/"),
            ("pages/eye-care.html", "/eye-care-services/"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_normalizes_canonical() {
        let map = sample();
        assert_eq!(map.lookup("pages/about.html"), Some("/about-us/"));
        assert_eq!(map.lookup("/pages/about.html"), Some("/about-us/"));
        assert_eq!(map.lookup("./pages/about.html"), Some("/about-us/"));
        assert_eq!(map.lookup("pages/missing.html"), None);
    }

    #[test]
    fn test_resolve_falls_back_to_normalized_source() {
        let map = sample();
        assert_eq!(map.resolve("pages/about.html"), "/about-us/");
        assert_eq!(map.resolve("contact"), "/contact/");
        assert_eq!(map.resolve("pages/missing.html"), "/pages/missing.html");
    }

    #[test]
    fn test_canonical_for_file() {
        let map = sample();
        assert_eq!(map.canonical_for_file("index.html"), "/");
        assert_eq!(map.canonical_for_file("pages/about.html"), "/about-us/");
        assert_eq!(map.canonical_for_file("blog/index.html"), "/blog/");
    }

    #[test]
    fn test_sources_for_aliases() {
        let map = sample();
        assert_eq!(
            map.sources_for("/eye-care-services/"),
            vec!["pages/services-eye-care.html", "pages/eye-care.html"]
        );
        assert_eq!(map.sources_for("eye-care-services"), map.sources_for("/eye-care-services/"));
        assert!(map.sources_for("/nowhere/").is_empty());
    }

    #[test]
    fn test_every_route_resolves_to_its_canonical() {
        let map = sample();
        for mapping in &map.mappings {
            assert_eq!(map.lookup(&mapping.source), Some(mapping.canonical.as_str()));
            assert_eq!(map.resolve(&mapping.source), mapping.canonical);
            assert!(map.sources_for(&mapping.canonical).contains(&mapping.source.as_str()));
        }
    }

    #[test]
    fn test_canonicals_are_distinct_and_ordered() {
        let map = sample();
        let canonicals: Vec<_> = map.canonicals().collect();
        assert_eq!(canonicals, vec!["/", "/about-us/", "/eye-care-services/"]);
    }

    #[test]
    fn test_duplicate_identical_pair_is_ignored() {
        let map = RouteMap::new([("a.html", "/a/"), ("a.html", "a")]).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_conflicting_source_is_rejected() {
        let err = RouteMap::new([("a.html", "/a/"), ("a.html", "/b/")]).unwrap_err();
        assert_eq!(
            err,
            RouteError::ConflictingSource {
                path: "a.html".into(),
                first: "/a/".into(),
                second: "/b/".into(),
            }
        );
    }

    #[test]
    fn test_empty_source_is_rejected() {
        assert_eq!(
            RouteMap::new([("/", "/x/")]).unwrap_err(),
            RouteError::EmptySource
        );
    }
}

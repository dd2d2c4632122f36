//! `[[route]]` entries: the route table.
//!
//! # Example
//!
//! ```toml
//! [[route]]
//! source = "pages/about/index.html"
//! canonical = "/about-us/"
//!
//! [[route]]
//! source = "pages/services/index.html"    # Declared first: used by `copy`
//! canonical = "/eye-care-services/"
//!
//! [[route]]
//! source = "pages/services.html"          # Legacy alias of the same route
//! canonical = "/eye-care-services/"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Repository-relative file path.
    pub source: String,
    /// Root-relative served path.
    pub canonical: String,
}

impl RouteEntry {
    pub const FIELD: FieldPath = FieldPath::new("route");
}

/// Check the whole table at once so every bad entry is reported together.
pub fn validate_routes(routes: &[RouteEntry], diag: &mut ConfigDiagnostics) {
    let mut seen: FxHashMap<&str, &str> = FxHashMap::default();

    for (i, route) in routes.iter().enumerate() {
        let source = route.source.trim().trim_start_matches("./").trim_start_matches('/');
        if source.is_empty() {
            diag.error(RouteEntry::FIELD, format!("route #{} has an empty source", i + 1));
            continue;
        }

        if !route.canonical.starts_with('/') {
            diag.error_with_hint(
                RouteEntry::FIELD,
                format!(
                    "canonical `{}` for `{source}` must be root-relative",
                    route.canonical
                ),
                format!("write `/{}`", route.canonical.trim_start_matches('/')),
            );
        }

        if route.canonical.contains(['?', '#']) {
            diag.error(
                RouteEntry::FIELD,
                format!("canonical `{}` must not carry a query or fragment", route.canonical),
            );
        }

        let canonical = crate::core::path::normalize(&route.canonical);
        match seen.get(source) {
            Some(&first) if crate::core::path::normalize(first) != canonical => {
                diag.error(
                    RouteEntry::FIELD,
                    format!(
                        "source `{source}` maps to both `{first}` and `{}`",
                        route.canonical
                    ),
                );
            }
            Some(_) => diag.warn(
                RouteEntry::FIELD,
                format!("source `{source}` is declared more than once"),
            ),
            None => {
                seen.insert(source, &route.canonical);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn entry(source: &str, canonical: &str) -> RouteEntry {
        RouteEntry {
            source: source.into(),
            canonical: canonical.into(),
        }
    }

    #[test]
    fn test_parse_route_table_in_order() {
        let config = test_parse_config(
            r#"
[[route]]
source = "pages/services/index.html"
canonical = "/eye-care-services/"

[[route]]
source = "pages/about/index.html"
canonical = "/about-us/"
"#,
        );
        assert_eq!(
            config.routes,
            vec![
                entry("pages/services/index.html", "/eye-care-services/"),
                entry("pages/about/index.html", "/about-us/"),
            ]
        );
    }

    #[test]
    fn test_validate_clean_table() {
        let mut diag = ConfigDiagnostics::new();
        validate_routes(
            &[entry("a.html", "/a/"), entry("b.html", "/a/"), entry("index.html", "/")],
            &mut diag,
        );
        assert!(diag.is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut diag = ConfigDiagnostics::new();
        validate_routes(
            &[
                entry("", "/x/"),
                entry("a.html", "about"),
                entry("b.html", "/b/"),
                entry("b.html", "/c/"),
                entry("c.html", "/c/?x=1"),
            ],
            &mut diag,
        );
        assert_eq!(diag.len(), 4);
    }

    #[test]
    fn test_validate_duplicate_identical_is_warning() {
        let mut diag = ConfigDiagnostics::new();
        validate_routes(&[entry("a.html", "/a/"), entry("/a.html", "/a")], &mut diag);
        assert!(diag.is_empty());
        assert_eq!(diag.warnings().len(), 1);
    }
}

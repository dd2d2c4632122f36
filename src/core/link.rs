//! Attribute reference classification.

use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;
use url::Url;

/// Leading `./` and `../` segments.
static RELATIVE_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\./|\.\./)+").expect("valid regex"));

/// Schemes and prefixes that never name a page or asset.
const EXCLUDED_SCHEMES: [&str; 4] = ["tel", "mailto", "javascript", "data"];

/// Hosts treated as this site when they appear in absolute URLs.
#[derive(Debug, Clone, Default)]
pub struct InternalHosts {
    hosts: FxHashSet<String>,
}

impl InternalHosts {
    /// Collect the origin's host plus extra aliases, lowercased.
    pub fn new<'a>(origin: &str, aliases: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hosts: FxHashSet<String> = aliases
            .into_iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        if let Some(host) = Url::parse(origin).ok().and_then(|u| u.host_str().map(str::to_string)) {
            hosts.insert(host.to_ascii_lowercase());
        }
        Self { hosts }
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(&host.to_ascii_lowercase())
    }
}

/// What an attribute value refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// Fragment, `tel:`, `mailto:`, `javascript:`, `data:`, or empty.
    Excluded(&'a str),
    /// A scheme or host outside this site.
    External(&'a str),
    /// Absolute URL on an internal host, reduced to path, query and fragment.
    InternalAbsolute(String),
    /// Root-relative or file-relative path.
    InternalRelative(&'a str),
    /// Looks like an absolute URL but does not parse as one.
    Malformed(&'a str),
}

impl<'a> LinkKind<'a> {
    /// Classify a trimmed attribute value.
    pub fn classify(value: &'a str, hosts: &InternalHosts) -> Self {
        if value.is_empty() || value.starts_with('#') {
            return Self::Excluded(value);
        }

        if value.starts_with("//") {
            return Self::classify_absolute(value, &format!("https:{value}"), hosts);
        }

        match scheme(value) {
            Some(s) if EXCLUDED_SCHEMES.iter().any(|e| s.eq_ignore_ascii_case(e)) => {
                Self::Excluded(value)
            }
            Some(s) if s.eq_ignore_ascii_case("http") || s.eq_ignore_ascii_case("https") => {
                Self::classify_absolute(value, value, hosts)
            }
            Some(_) => Self::External(value),
            None => Self::InternalRelative(value),
        }
    }

    fn classify_absolute(value: &'a str, absolute: &str, hosts: &InternalHosts) -> Self {
        let Ok(url) = Url::parse(absolute) else {
            return Self::Malformed(value);
        };
        match url.host_str() {
            Some(host) if hosts.contains(host) => {
                let mut local = url.path().to_string();
                if let Some(query) = url.query() {
                    local.push('?');
                    local.push_str(query);
                }
                if let Some(fragment) = url.fragment() {
                    local.push('#');
                    local.push_str(fragment);
                }
                Self::InternalAbsolute(local)
            }
            Some(_) => Self::External(value),
            None => Self::Malformed(value),
        }
    }
}

/// URL scheme of `link`, if it starts with one.
///
/// A scheme is at least one ASCII alphanumeric, `+`, `-` or `.` before the
/// first colon, and the colon comes before any `/`, `?` or `#`.
pub fn scheme(link: &str) -> Option<&str> {
    let colon = link.find(':')?;
    let candidate = &link[..colon];
    let valid = !candidate.is_empty()
        && candidate.starts_with(|c: char| c.is_ascii_alphabetic())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}

/// Split `path?query#fragment` into `path` and the suffix starting at `?` or `#`.
pub fn split_suffix(link: &str) -> (&str, &str) {
    match link.find(['?', '#']) {
        Some(pos) => link.split_at(pos),
        None => (link, ""),
    }
}

/// Lookup key of a relative path: leading `./`, `../` and `/` dropped.
///
/// No directory resolution happens, so `../../images/x.png` and
/// `images/x.png` share a key.
pub fn collapse_relative(path: &str) -> &str {
    let rest = RELATIVE_DOTS.find(path).map_or(path, |m| &path[m.end()..]);
    rest.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> InternalHosts {
        InternalHosts::new("https://example.com", ["www.example.com", "Example.Net"])
    }

    #[test]
    fn test_internal_hosts() {
        let hosts = hosts();
        assert!(hosts.contains("example.com"));
        assert!(hosts.contains("WWW.EXAMPLE.COM"));
        assert!(hosts.contains("example.net"));
        assert!(!hosts.contains("cdn.example.com"));
    }

    #[test]
    fn test_classify_excluded() {
        let hosts = hosts();
        for value in [
            "",
            "#top",
            "tel:+15551234",
            "mailto:hi@example.com",
            "javascript:void(0)",
            "data:image/png;base64,AAAA",
            "MAILTO:HI@EXAMPLE.COM",
        ] {
            assert_eq!(LinkKind::classify(value, &hosts), LinkKind::Excluded(value));
        }
    }

    #[test]
    fn test_classify_external() {
        let hosts = hosts();
        for value in [
            "https://fonts.googleapis.com/css",
            "http://cdn.example.com/app.js",
            "//cdn.jsdelivr.net/npm/x.js",
            "ftp://files.example.org/a",
            "sms:+15551234",
        ] {
            assert_eq!(LinkKind::classify(value, &hosts), LinkKind::External(value));
        }
    }

    #[test]
    fn test_classify_internal_absolute() {
        let hosts = hosts();
        assert_eq!(
            LinkKind::classify("https://example.com/pages/about.html", &hosts),
            LinkKind::InternalAbsolute("/pages/about.html".into())
        );
        assert_eq!(
            LinkKind::classify("https://www.example.com", &hosts),
            LinkKind::InternalAbsolute("/".into())
        );
        assert_eq!(
            LinkKind::classify("//example.com/book?x=1#form", &hosts),
            LinkKind::InternalAbsolute("/book?x=1#form".into())
        );
        assert_eq!(
            LinkKind::classify("HTTPS://EXAMPLE.COM/a", &hosts),
            LinkKind::InternalAbsolute("/a".into())
        );
    }

    #[test]
    fn test_classify_relative() {
        let hosts = hosts();
        for value in ["pages/about.html", "/about-us/", "../x.html", "./a", "?page=2", "a:b/c"] {
            let kind = LinkKind::classify(value, &hosts);
            if value == "a:b/c" {
                // Looks like a scheme; left alone as external
                assert_eq!(kind, LinkKind::External(value));
            } else {
                assert_eq!(kind, LinkKind::InternalRelative(value));
            }
        }
    }

    #[test]
    fn test_classify_malformed_absolute() {
        let hosts = hosts();
        assert_eq!(
            LinkKind::classify("http://exa mple.com/", &hosts),
            LinkKind::Malformed("http://exa mple.com/")
        );
    }

    #[test]
    fn test_scheme() {
        assert_eq!(scheme("https://x"), Some("https"));
        assert_eq!(scheme("mailto:a@b"), Some("mailto"));
        assert_eq!(scheme("/a:b"), None);
        assert_eq!(scheme(":nothing"), None);
        assert_eq!(scheme("1abc:x"), None);
        assert_eq!(scheme("about"), None);
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("/a/?q=1#x"), ("/a/", "?q=1#x"));
        assert_eq!(split_suffix("a.html#team"), ("a.html", "#team"));
        assert_eq!(split_suffix("?page=2"), ("", "?page=2"));
        assert_eq!(split_suffix("/plain/"), ("/plain/", ""));
    }

    #[test]
    fn test_collapse_relative() {
        assert_eq!(collapse_relative("../../images/x.png"), "images/x.png");
        assert_eq!(collapse_relative("./pages/a.html"), "pages/a.html");
        assert_eq!(collapse_relative("/pages/a.html"), "pages/a.html");
        assert_eq!(collapse_relative("pages/../a.html"), "pages/../a.html");
        assert_eq!(collapse_relative(".."), "..");
    }
}

//! Internal link rewriting.
//!
//! Every `href`, `src`, `srcset` and configured `data-*` value that points
//! inside the site is rewritten to its canonical, root-relative form:
//!
//! | value                                   | result                 |
//! |-----------------------------------------|------------------------|
//! | `pages/services/index.html`             | `/eye-care-services/`  |
//! | `../pages/patients/book.html?utm=ads`   | `/book-now/?utm=ads`   |
//! | `https://example.com/pages/about.html`  | `/about-us/`           |
//! | `../images/logo.png`                    | `/images/logo.png`     |
//! | `pages/unmapped.html`                   | `/pages/unmapped.html` |
//! | `#top`, `mailto:..`, `https://other/..` | unchanged              |
//!
//! Relative values are collapsed, not resolved against the referencing
//! file: leading `./` and `../` segments are dropped and the remainder is
//! looked up as a site-root-relative path.
//!
//! Output values are fixed points: rewriting a rewritten document changes
//! nothing.

use crate::core::{
    InternalHosts, LinkKind, RouteMap, collapse_relative, path::normalize, split_suffix,
};
use crate::pipeline::scan::{Edits, Tag, tags};

/// Attributes holding a single URL.
const URL_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Result of rewriting one document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Rewritten {
    pub html: String,
    /// Attribute values changed.
    pub rewritten: usize,
    /// Values left untouched because they could not be parsed safely.
    pub unmatched: usize,
    /// Internal paths with no route mapping, normalized in place.
    pub passthrough: usize,
}

/// Outcome for one URL value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Leave as is: excluded, external, or nothing to map.
    Keep,
    /// Malformed; left as is and counted.
    Unmatched,
    /// Mapped through the route table or an asset prefix.
    Mapped(String),
    /// Internal but unmapped; normalized pass-through.
    PassThrough(String),
}

/// Rewrites link-bearing attributes through the route table.
pub struct LinkRewriter<'a> {
    routes: &'a RouteMap,
    hosts: &'a InternalHosts,
    asset_prefixes: Vec<String>,
    data_attributes: Vec<String>,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(routes: &'a RouteMap, hosts: &'a InternalHosts) -> Self {
        Self {
            routes,
            hosts,
            asset_prefixes: Vec::new(),
            data_attributes: Vec::new(),
        }
    }

    /// Prefixes such as `images/` whose paths are assets, never routes.
    pub fn with_asset_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.asset_prefixes = prefixes;
        self
    }

    /// Extra `data-*` attributes that carry URLs.
    pub fn with_data_attributes(mut self, attributes: Vec<String>) -> Self {
        self.data_attributes = attributes;
        self
    }

    /// Rewrite every eligible attribute value in `html`.
    pub fn rewrite(&self, html: &str) -> Rewritten {
        let mut edits = Edits::new();
        let mut result = Rewritten::default();

        for tag in tags(html).filter(|t| !t.closing) {
            self.rewrite_tag(&tag, &mut edits, &mut result);
        }

        result.html = if edits.is_empty() {
            html.to_string()
        } else {
            edits.apply(html)
        };
        result
    }

    fn rewrite_tag(&self, tag: &Tag<'_>, edits: &mut Edits, result: &mut Rewritten) {
        for attr in &tag.attrs {
            let is_srcset = attr.name.eq_ignore_ascii_case("srcset");
            let is_url = URL_ATTRIBUTES
                .iter()
                .any(|a| attr.name.eq_ignore_ascii_case(a))
                || self
                    .data_attributes
                    .iter()
                    .any(|a| attr.name.eq_ignore_ascii_case(a));
            if !is_srcset && !is_url {
                continue;
            }
            let Some(value) = &attr.value else {
                continue;
            };

            if !value.is_well_formed() {
                crate::debug!("rewrite"; "unmatched {}={:?}", attr.name, value.text);
                result.unmatched += 1;
                continue;
            }

            let replacement = if is_srcset {
                self.rewrite_srcset(value.text, result)
            } else {
                self.rewrite_value(value.text, result)
            };

            if let Some(new) = replacement
                && new != value.text
            {
                edits.replace(value.span.clone(), new);
                result.rewritten += 1;
            }
        }
    }

    /// Rewrite one URL value, tallying into `result`. `None` keeps the value.
    fn rewrite_value(&self, raw: &str, result: &mut Rewritten) -> Option<String> {
        let trimmed = raw.trim();
        match self.resolve(trimmed) {
            Resolution::Keep => None,
            Resolution::Unmatched => {
                crate::debug!("rewrite"; "unmatched value {:?}", raw);
                result.unmatched += 1;
                None
            }
            Resolution::Mapped(path) => Some(rewrap(raw, trimmed, &path)),
            Resolution::PassThrough(path) => {
                crate::debug!("rewrite"; "no mapping for {:?}, using {}", trimmed, path);
                result.passthrough += 1;
                Some(rewrap(raw, trimmed, &path))
            }
        }
    }

    /// Rewrite the URL of each `url descriptor` candidate; descriptors stay verbatim.
    fn rewrite_srcset(&self, srcset: &str, result: &mut Rewritten) -> Option<String> {
        if srcset.contains("data:") {
            return None;
        }

        let mut changed = false;
        let parts: Vec<String> = srcset
            .split(',')
            .map(|part| {
                let start = part.len() - part.trim_start().len();
                let url_end = part[start..]
                    .find(char::is_whitespace)
                    .map_or(part.len(), |i| start + i);
                let url = &part[start..url_end];
                if url.is_empty() {
                    return part.to_string();
                }
                match self.rewrite_value(url, result) {
                    Some(new) if new != url => {
                        changed = true;
                        format!("{}{new}{}", &part[..start], &part[url_end..])
                    }
                    _ => part.to_string(),
                }
            })
            .collect();

        changed.then(|| parts.join(","))
    }

    /// Resolve a trimmed URL value.
    pub fn resolve(&self, value: &str) -> Resolution {
        match LinkKind::classify(value, self.hosts) {
            LinkKind::Excluded(_) | LinkKind::External(_) => Resolution::Keep,
            LinkKind::Malformed(_) => Resolution::Unmatched,
            LinkKind::InternalAbsolute(local) => self.resolve_internal(&local),
            LinkKind::InternalRelative(path) => self.resolve_internal(path),
        }
    }

    fn resolve_internal(&self, value: &str) -> Resolution {
        let (path, suffix) = split_suffix(value);
        let rooted = path.starts_with('/');
        let key = collapse_relative(path);

        if key.is_empty() || key == "." || key == ".." {
            // Same-document query, `./` or bare `/`: only the root is a route
            return if rooted {
                Resolution::Mapped(format!("/{suffix}"))
            } else {
                Resolution::Keep
            };
        }

        if self.asset_prefixes.iter().any(|p| key.starts_with(p.as_str())) {
            return Resolution::Mapped(format!("/{key}{suffix}"));
        }

        match self.routes.lookup(key) {
            Some(canonical) => Resolution::Mapped(format!("{canonical}{suffix}")),
            None => {
                let normalized = normalize(key);
                if self.routes.is_canonical(&normalized) {
                    Resolution::Mapped(format!("{normalized}{suffix}"))
                } else {
                    Resolution::PassThrough(format!("{normalized}{suffix}"))
                }
            }
        }
    }
}

/// Put surrounding whitespace of the original value back around `new`.
fn rewrap(raw: &str, trimmed: &str, new: &str) -> String {
    if raw.len() == trimmed.len() {
        return new.to_string();
    }
    let lead = raw.len() - raw.trim_start().len();
    let trail_start = lead + trimmed.len();
    format!("{}{new}{}", &raw[..lead], &raw[trail_start..])
}

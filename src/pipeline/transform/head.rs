//! Canonical link and social meta tags.
//!
//! Two independent upserts over a document's `<head>`:
//!
//! - `upsert_canonical`: replace the `href` of an existing
//!   `<link rel="canonical">`, or insert one after the description meta,
//!   or after `</title>`.
//! - `upsert_social_tags`: drop every `og:*` and `twitter:*` meta tag, then
//!   write a fresh block after the canonical link (or before `</head>`).
//!
//! Both are fixed points: applying either twice with the same inputs
//! changes nothing the second time.

use crate::core::SkipReason;
use crate::pipeline::scan::{Edits, Tag, line_end, line_start, newline, tags};
use crate::utils::html::escape_attr;
use std::ops::Range;

/// Result of one upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Updated(String),
    Unchanged,
    Skipped(SkipReason),
}

impl Upsert {
    fn from_edits(html: &str, edits: Edits) -> Self {
        if edits.is_empty() {
            return Self::Unchanged;
        }
        let out = edits.apply(html);
        if out == html {
            Self::Unchanged
        } else {
            Self::Updated(out)
        }
    }
}

/// Values for the social block. `title` and `description` are unescaped text.
#[derive(Debug, Clone)]
pub struct SocialTags<'a> {
    pub url: &'a str,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub og_type: &'a str,
    pub twitter_card: &'a str,
}

impl SocialTags<'_> {
    fn render(&self) -> Vec<String> {
        let property = |name: &str, value: &str| {
            format!(r#"<meta property="{name}" content="{}">"#, escape_attr(value))
        };

        let mut out = Vec::with_capacity(5);
        if let Some(title) = self.title {
            out.push(property("og:title", title));
        }
        if let Some(description) = self.description {
            out.push(property("og:description", description));
        }
        out.push(property("og:url", self.url));
        out.push(property("og:type", self.og_type));
        out.push(format!(
            r#"<meta name="twitter:card" content="{}">"#,
            escape_attr(self.twitter_card)
        ));
        out
    }
}

// =============================================================================
// Head scan
// =============================================================================

/// Landmarks in the head region.
#[derive(Default)]
struct Head<'a> {
    canonical: Option<Tag<'a>>,
    description: Option<Tag<'a>>,
    title_end: Option<Tag<'a>>,
    head_end: Option<Tag<'a>>,
    social: Vec<Range<usize>>,
}

impl<'a> Head<'a> {
    /// Scan up to `</head>`, or the whole document when there is none.
    fn scan(html: &'a str) -> Self {
        let mut head = Self::default();

        for tag in tags(html) {
            if tag.is_end("head") {
                head.head_end = Some(tag);
                break;
            }
            if tag.is_end("title") {
                head.title_end.get_or_insert(tag);
            } else if tag.is_canonical_link() {
                head.canonical.get_or_insert(tag);
            } else if tag.is_start("meta") {
                if is_social(&tag) {
                    head.social.push(tag.span.clone());
                } else if head.description.is_none()
                    && tag
                        .attr_value("name")
                        .is_some_and(|n| n.trim().eq_ignore_ascii_case("description"))
                {
                    head.description = Some(tag);
                }
            }
        }

        head
    }
}

fn is_social(tag: &Tag<'_>) -> bool {
    ["property", "name"].iter().any(|attr| {
        tag.attr_value(attr).is_some_and(|key| {
            let key = key.trim().to_ascii_lowercase();
            key.starts_with("og:") || key.starts_with("twitter:")
        })
    })
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(html: &str, pos: usize) -> &str {
    let start = line_start(html, pos);
    let line = &html[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

// =============================================================================
// Canonical
// =============================================================================

/// Point the document's canonical link at `url`.
pub fn upsert_canonical(html: &str, url: &str) -> Upsert {
    let head = Head::scan(html);
    let href = escape_attr(url);
    let mut edits = Edits::new();

    if let Some(tag) = &head.canonical {
        match tag.attr("href").map(|a| a.value.as_ref()) {
            Some(Some(value)) if value.is_well_formed() => {
                if value.text == href {
                    return Upsert::Unchanged;
                }
                edits.replace(value.span.clone(), href);
            }
            Some(_) => {
                return Upsert::Skipped(SkipReason::MalformedDocument(
                    "canonical link with an unreadable href",
                ));
            }
            None if tag.terminated => {
                let close = if tag.self_closing { 2 } else { 1 };
                edits.insert(tag.span.end - close, format!(r#" href="{href}""#));
            }
            None => {
                return Upsert::Skipped(SkipReason::MalformedDocument(
                    "unterminated canonical link",
                ));
            }
        }
        return Upsert::from_edits(html, edits);
    }

    let Some(anchor) = head.description.as_ref().or(head.title_end.as_ref()) else {
        return Upsert::Skipped(SkipReason::MalformedDocument(
            "no description meta or </title> to anchor the canonical link",
        ));
    };

    edits.insert(
        anchor.span.end,
        format!(
            r#"{}{}<link rel="canonical" href="{href}">"#,
            newline(html),
            line_indent(html, anchor.span.start)
        ),
    );
    Upsert::from_edits(html, edits)
}

// =============================================================================
// Social tags
// =============================================================================

/// Replace every `og:*` and `twitter:*` meta tag with a fresh block.
///
/// Without a title or a description the stale tags are still removed but
/// nothing is written.
pub fn upsert_social_tags(html: &str, social: &SocialTags<'_>) -> Upsert {
    let head = Head::scan(html);
    let nl = newline(html);
    let mut edits = Edits::new();

    // Insertions go first so a removal starting at the same offset cannot shadow them
    if social.title.is_some() || social.description.is_some() {
        let block = social.render();

        if let Some(canonical) = &head.canonical {
            let indent = line_indent(html, canonical.span.start);
            let text: String = block.iter().map(|t| format!("{nl}{indent}{t}")).collect();
            edits.insert(canonical.span.end, text);
        } else if let Some(head_end) = &head.head_end {
            let at = head_end.span.start;
            let start = line_start(html, at);
            let prefix = &html[start..at];
            if prefix.trim().is_empty() {
                let text: String = block.iter().map(|t| format!("{prefix}  {t}{nl}")).collect();
                edits.insert(start, text);
            } else {
                edits.insert(at, block.concat());
            }
        } else {
            return Upsert::Skipped(SkipReason::MalformedDocument(
                "no canonical link or </head> to anchor social tags",
            ));
        }
    }

    for span in removal_spans(html, &head.social) {
        edits.remove(span);
    }

    Upsert::from_edits(html, edits)
}

/// Group adjacent tags and widen each group to swallow the lines it empties.
fn removal_spans(html: &str, spans: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut clusters: Vec<Range<usize>> = Vec::new();
    for span in spans {
        match clusters.last_mut() {
            Some(last) if html[last.end..span.start].trim().is_empty() => last.end = span.end,
            _ => clusters.push(span.clone()),
        }
    }

    clusters
        .into_iter()
        .map(|cluster| {
            let ls = line_start(html, cluster.start);
            let le = line_end(html, cluster.end);
            let prefix_blank = html[ls..cluster.start].trim().is_empty();
            let suffix_blank = html[cluster.end..le].trim().is_empty();

            match (prefix_blank, suffix_blank) {
                (true, true) => ls..(le + 1).min(html.len()),
                (true, false) if ls > 0 => {
                    let mut start = ls - 1;
                    if start > 0 && html.as_bytes()[start - 1] == b'\r' {
                        start -= 1;
                    }
                    start..cluster.end
                }
                _ => cluster,
            }
        })
        .collect()
}

//! Metadata scraped from a document's `<head>`.

use crate::pipeline::scan::tags;
use crate::utils::html::unescape;

/// Title and description as a reader sees them (entities decoded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadMeta {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl HeadMeta {
    /// Read the first `<title>` and `<meta name="description">` before `</head>`.
    pub fn extract(html: &str) -> Self {
        let mut meta = Self::default();
        let mut title_start = None;

        for tag in tags(html) {
            if tag.is_end("head") {
                break;
            }

            if let Some(start) = title_start.take() {
                if tag.is_end("title") && meta.title.is_none() {
                    meta.title = clean(&html[start..tag.span.start]);
                }
            }

            if tag.is_start("title") && !tag.self_closing && meta.title.is_none() {
                title_start = Some(tag.span.end);
            } else if tag.is_start("meta")
                && meta.description.is_none()
                && tag
                    .attr_value("name")
                    .is_some_and(|n| n.trim().eq_ignore_ascii_case("description"))
            {
                meta.description = tag.attr_value("content").and_then(clean);
            }
        }

        meta
    }

    /// Nothing usable for a social block.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Decode entities and collapse whitespace; empty becomes `None`.
fn clean(raw: &str) -> Option<String> {
    let text = unescape(raw).split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

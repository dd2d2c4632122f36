//! Generated site files.
//!
//! - **Sitemap**: search engine indexing (`sitemap.xml`), built from the
//!   canonical route tree after documents have been rewritten.

pub mod sitemap;

pub use sitemap::{SitemapOutcome, build_sitemap};

use std::borrow::Cow;

/// Join trimmed, non-empty lines when `enabled`.
pub fn minify_xml(xml: &str, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(xml);
    }
    Cow::Owned(
        xml.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect(),
    )
}

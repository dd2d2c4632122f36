//! `sitemap` command.

use anyhow::Result;

use crate::config::SiteConfig;
use crate::core::RouteMap;
use crate::generator::{SitemapOutcome, build_sitemap};
use crate::log;
use crate::utils::plural::plural_count;

/// Build the sitemap and report where it went.
pub fn run_sitemap(config: &SiteConfig, routes: &RouteMap, dry: bool) -> Result<SitemapOutcome> {
    let outcome = build_sitemap(config, routes, dry)?;

    let target = outcome
        .path
        .strip_prefix(&config.root)
        .unwrap_or(&outcome.path)
        .display()
        .to_string();
    let verb = if outcome.written { "wrote" } else { "would write" };
    log!(
        "sitemap";
        "{verb} {target}: {}, {} dated from history",
        plural_count(outcome.entries, "url"),
        outcome.from_history
    );

    Ok(outcome)
}

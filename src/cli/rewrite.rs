//! `rewrite` command: canonical link rewriting over every page.

use anyhow::Result;

use crate::cli::PassArgs;
use crate::cli::common::{collect_pages, run_pass};
use crate::config::SiteConfig;
use crate::core::{FileOutcome, InternalHosts, RouteMap, RunReport};
use crate::log;
use crate::pipeline::LinkRewriter;

/// Rewrite internal `href`, `src`, `srcset` and `data-*` values in place.
pub fn run_rewrite(
    config: &SiteConfig,
    routes: &RouteMap,
    hosts: &InternalHosts,
    args: &PassArgs,
) -> Result<RunReport> {
    let tree = config.tree(&config.rewrite.exclude);
    let files = collect_pages(&args.paths, &tree)?;
    log!("rewrite"; "{} pages, {} routes", files.len(), routes.len());

    let rewriter = LinkRewriter::new(routes, hosts)
        .with_asset_prefixes(config.rewrite.prefixes())
        .with_data_attributes(config.rewrite.data_attributes.clone());

    Ok(run_pass("rewrite", &tree, &files, args.dry, |rel, html| {
        let rewritten = rewriter.rewrite(html);
        let outcome = FileOutcome {
            unmatched: rewritten.unmatched,
            passthrough: rewritten.passthrough,
            ..FileOutcome::new(rel)
        };
        (outcome, Some(rewritten.html))
    }))
}

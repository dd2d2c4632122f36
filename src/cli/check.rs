//! `check` command: read-only consistency report.

use std::fs;

use anyhow::{Context, Result};

use crate::check::{CheckReport, Checker, Manifests};
use crate::cli::CheckArgs;
use crate::cli::common::collect_pages;
use crate::config::SiteConfig;
use crate::core::{InternalHosts, RouteMap};
use crate::log;
use crate::utils::date::DateTimeUtc;
use crate::utils::plural::plural_count;

/// Run the checker. With paths only those pages are read; the site-wide
/// checks always run.
pub fn run_check(
    config: &SiteConfig,
    routes: &RouteMap,
    hosts: &InternalHosts,
    args: &CheckArgs,
    manifests: &Manifests,
) -> Result<CheckReport> {
    let checker = Checker::from_config(config, routes, hosts);

    let report = if args.paths.is_empty() {
        checker.check_site(manifests)
    } else {
        let tree = config.tree(&config.check.exclude);
        let files = collect_pages(&args.paths, &tree)?;
        checker.check(manifests, &files)
    };

    log!("check"; "{} checked, {report}", plural_count(report.pages, "page"));
    report.print();

    if let Some(output) = &args.output {
        let date = DateTimeUtc::now().to_date_string();
        fs::write(output, report.to_markdown(&config.root, &date))
            .with_context(|| format!("failed to write report to {}", output.display()))?;
        log!("check"; "report written to {}", output.display());
    }

    Ok(report)
}

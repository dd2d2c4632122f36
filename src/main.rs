//! reroute - canonical route migration for static HTML sites.

mod check;
mod cli;
mod config;
mod core;
mod generator;
mod logger;
mod pipeline;
mod utils;

use std::process::ExitCode;

use anyhow::Result;
use check::{CheckReport, Manifests};
use clap::{ColorChoice, Parser};
use cli::{CheckArgs, Cli, Commands, PassArgs};
use config::SiteConfig;
use crate::core::{InternalHosts, RouteMap, RunReport};

/// Exit code for violations, unmatched values or missing copy sources.
const EXIT_FINDINGS: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_FINDINGS),
        Err(err) => {
            log!("error"; "{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run one command. `Ok(false)` means it finished with findings.
fn run(cli: &Cli) -> Result<bool> {
    let config = SiteConfig::load(cli)?;
    let routes = config.route_map()?;
    let hosts = config.internal_hosts();
    debug!("config"; "{} routes from {}", routes.len(), config.config_path.display());

    match &cli.command {
        Commands::Rewrite { args } => {
            let report = cli::rewrite::run_rewrite(&config, &routes, &hosts, args)?;
            Ok(summarize(&report))
        }
        Commands::Head { args } => {
            let report = cli::head::run_head(&config, &routes, args)?;
            Ok(summarize(&report))
        }
        Commands::Sitemap { dry } => {
            cli::sitemap::run_sitemap(&config, &routes, *dry)?;
            Ok(true)
        }
        Commands::Check { args } => {
            let manifests = Manifests::load(&config)?;
            let report = cli::check::run_check(&config, &routes, &hosts, args, &manifests)?;
            Ok(summarize(&check_summary(&report)))
        }
        Commands::Copy { overwrite, dry } => {
            Ok(cli::copy::run_copy(&config, &routes, *overwrite, *dry).is_clean())
        }
        Commands::All { dry, output } => {
            run_all(&config, &routes, &hosts, *dry, output.clone())
        }
    }
}

// =============================================================================
// All Command
// =============================================================================

/// Rewrite, head, sitemap, then check, in data-flow order.
///
/// Manifests load first so a bad one stops the run before any page is written.
fn run_all(
    config: &SiteConfig,
    routes: &RouteMap,
    hosts: &InternalHosts,
    dry: bool,
    output: Option<std::path::PathBuf>,
) -> Result<bool> {
    let manifests = Manifests::load(config)?;
    let pass = PassArgs {
        paths: Vec::new(),
        dry,
    };

    let mut total = cli::rewrite::run_rewrite(config, routes, hosts, &pass)?;
    log!("rewrite"; "{total}");

    let head = cli::head::run_head(config, routes, &pass)?;
    log!("head"; "{head}");
    total.merge(head);

    cli::sitemap::run_sitemap(config, routes, dry)?;

    let args = CheckArgs {
        paths: Vec::new(),
        output,
    };
    let check = cli::check::run_check(config, routes, hosts, &args, &manifests)?;
    total.violations += check.violations.len();

    Ok(summarize(&total))
}

/// Summary line for a check run.
fn check_summary(report: &CheckReport) -> RunReport {
    RunReport {
        scanned: report.pages,
        violations: report.violations.len(),
        ..RunReport::default()
    }
}

/// Print the summary line and skip details; true when the run is clean.
fn summarize(report: &RunReport) -> bool {
    log!("summary"; "{report}");
    report.print_skips();
    report.is_clean()
}

//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Canonical route migration for static sites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file name, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "reroute.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Override `[site] origin`, e.g. for a staging host
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Print per-file details
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rewrite internal href/src/srcset values to canonical routes
    #[command(visible_alias = "r")]
    Rewrite {
        #[command(flatten)]
        args: PassArgs,
    },

    /// Upsert canonical, Open Graph and Twitter Card tags
    #[command(visible_alias = "h")]
    Head {
        #[command(flatten)]
        args: PassArgs,
    },

    /// Generate the sitemap from canonical route directories
    #[command(visible_alias = "s")]
    Sitemap {
        /// Build the sitemap without writing it
        #[arg(short = 'n', long)]
        dry: bool,
    },

    /// Verify redirects, canonical tags and legacy links (read-only)
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: CheckArgs,
    },

    /// Copy each route's first declared source to `<route>/index.html`
    Copy {
        /// Replace destinations that already exist
        #[arg(long)]
        overwrite: bool,

        /// Report what would be copied without writing
        #[arg(short = 'n', long)]
        dry: bool,
    },

    /// Run rewrite, head, sitemap and check in order
    #[command(visible_alias = "a")]
    All {
        /// Compute every pass without writing
        #[arg(short = 'n', long)]
        dry: bool,

        /// Also write the check results as a markdown report
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

/// Shared arguments for the per-document passes.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PassArgs {
    /// Files or directories to process. If omitted, processes the whole site.
    /// Use `-` to read paths from stdin.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Compute changes and report them without writing
    #[arg(short = 'n', long)]
    pub dry: bool,
}

/// Check command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Files or directories whose pages are checked. Site-wide checks always run.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Also write the results as a markdown report
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rewrite_with_paths() {
        let cli = Cli::try_parse_from(["reroute", "r", "--dry", "pages", "index.html"]).unwrap();
        match cli.command {
            Commands::Rewrite { args } => {
                assert!(args.dry);
                assert_eq!(args.paths, vec![PathBuf::from("pages"), PathBuf::from("index.html")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, PathBuf::from("reroute.toml"));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reroute",
            "check",
            "-o",
            "qa.md",
            "-C",
            "site.toml",
            "--origin",
            "https://staging.example.com",
            "-V",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert_eq!(cli.origin.as_deref(), Some("https://staging.example.com"));
        match cli.command {
            Commands::Check { args } => assert_eq!(args.output, Some(PathBuf::from("qa.md"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_copy_overwrite() {
        for (argv, expected) in [
            (vec!["reroute", "copy"], false),
            (vec!["reroute", "copy", "--overwrite"], true),
        ] {
            let cli = Cli::try_parse_from(argv).unwrap();
            match cli.command {
                Commands::Copy { overwrite, .. } => assert_eq!(overwrite, expected),
                other => panic!("unexpected command: {other:?}"),
            }
        }
    }

    #[test]
    fn test_requires_subcommand() {
        assert!(Cli::try_parse_from(["reroute"]).is_err());
    }
}

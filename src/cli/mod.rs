//! Command-line interface module.
//!
//! One module per subcommand; `common` holds the page collection and the
//! parallel per-page pass they share.

mod args;
pub mod check;
pub mod common;
pub mod copy;
pub mod head;
pub mod rewrite;
pub mod sitemap;

pub use args::{CheckArgs, Cli, Commands, PassArgs};

//! Core types shared by every pass: paths, routes, links, the file tree.

pub mod path;
mod link;
mod report;
mod route;
mod tree;

pub use link::{InternalHosts, LinkKind, collapse_relative, split_suffix};
pub use report::{FileOutcome, RunReport, SkipReason};
pub use route::RouteMap;
pub use tree::SiteTree;

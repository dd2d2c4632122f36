//! Configuration section definitions.
//!
//! Each module corresponds to a section in `reroute.toml`:
//!
//! | Module    | TOML Section  | Purpose                              |
//! |-----------|---------------|--------------------------------------|
//! | `site`    | `[site]`      | Origin, internal hosts, exclusions   |
//! | `route`   | `[[route]]`   | Source path -> canonical path table  |
//! | `rewrite` | `[rewrite]`   | Attribute rewriting                  |
//! | `head`    | `[head]`      | Canonical and social tags            |
//! | `sitemap` | `[sitemap]`   | Sitemap output                       |
//! | `check`   | `[check]`     | Consistency checks and manifests     |

mod check;
mod head;
mod rewrite;
mod route;
mod site;
mod sitemap;

pub use check::CheckSection;
pub use head::HeadSection;
pub use rewrite::RewriteSection;
pub use route::{RouteEntry, validate_routes};
pub use site::SiteSection;
pub use sitemap::SitemapSection;

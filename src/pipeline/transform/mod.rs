//! Document transforms.
//!
//! Each transform is a pure function of the document text and the
//! configuration it was built with. File I/O lives in the command layer.
//!
//! # Modules
//!
//! - `link`: rewrites `href`, `src`, `srcset` and `data-*` URLs through the route table
//! - `head`: upserts the canonical link and the Open Graph / Twitter block

mod head;
mod link;

pub use head::{SocialTags, Upsert, upsert_canonical, upsert_social_tags};
pub use link::LinkRewriter;

//! HTML processing pipeline.
//!
//! ```text
//! document text
//!   -> scan       (tags and attribute values with byte spans)
//!   -> extract    (title, description)
//!   -> transform  (link rewriting, head upserts)
//!   -> document text
//! ```
//!
//! Edits are spliced into the original text, so untouched markup keeps its
//! exact bytes. Nothing here touches the filesystem.

pub mod extract;
pub mod scan;
pub mod transform;

pub use extract::HeadMeta;
pub use transform::{
    LinkRewriter, SocialTags, Upsert, upsert_canonical, upsert_social_tags,
};

//! Core business entities.

pub mod link;
pub mod tag;

pub use link::{Link, LinkPatch, NewLink};
pub use tag::{normalize_tag_name, Tag, MAX_TAG_NAME_LEN};

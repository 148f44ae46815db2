//! Wikilink resolution and content rewriting.
//!
//! Wikilinks are resolved against the [`NoteIndex`](crate::index::NoteIndex):
//! a link to an indexed note becomes a site link, a link to an image becomes a
//! relative asset link and anything else degrades to plain text.

pub mod sections;
pub mod wikilink;

pub use sections::strip_highlights;
pub use wikilink::{
    IMAGE_EXTENSIONS, LinkTarget, Wikilink, is_image_name, resolve_link, rewrite_links,
    unresolved_links, wikilink_targets, wikilinks,
};

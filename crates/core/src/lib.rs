//! Publish notes from a markdown vault into a site content tree.
//!
//! Notes opt in through frontmatter (`slug`, `collection`, `publish: true`).
//! Their wikilinks are rewritten against an in-memory [`index::NoteIndex`] and
//! the result is written under the configured output directory, which is then
//! kept current as vault files change.

pub mod config;
pub mod frontmatter;
pub mod index;
pub mod pipeline;
pub mod resolve;
pub mod sync;
pub mod vault;

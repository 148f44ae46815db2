//! Wikilink scanning and rewriting.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::index::{Note, NoteIndex};

/// File extensions treated as embedded images.
pub const IMAGE_EXTENSIONS: [&str; 3] = [".webp", ".png", ".jpg"];

// Matches [[target]] or [[target|label]], shortest interior first
static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.+?)\]\]").expect("valid wikilink regex"));

/// A wikilink occurrence in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wikilink<'a> {
    /// Byte range of the whole `[[...]]` markup.
    pub range: Range<usize>,
    /// Text before the first `|`.
    pub target: &'a str,
    /// Text after the first `|`, if any.
    pub label: Option<&'a str>,
}

/// What a wikilink points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// An indexed note.
    Note(&'a Note),
    /// An image asset, by file name.
    Image,
    /// Nothing known; rendered as plain text.
    Unresolved,
}

/// Iterate over every wikilink in `content`, in source order.
pub fn wikilinks(content: &str) -> impl Iterator<Item = Wikilink<'_>> {
    WIKILINK_RE.captures_iter(content).filter_map(|cap| {
        let whole = cap.get(0)?;
        let inner = cap.get(1)?.as_str();
        let (target, label) = match inner.split_once('|') {
            Some((target, label)) => (target, Some(label)),
            None => (inner, None),
        };
        Some(Wikilink { range: whole.range(), target, label })
    })
}

/// Targets of every wikilink in `content`.
pub fn wikilink_targets(content: &str) -> impl Iterator<Item = &str> {
    wikilinks(content).map(|link| link.target)
}

pub fn is_image_name(name: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Classify a wikilink target against the index.
pub fn resolve_link<'i>(target: &str, index: &'i NoteIndex) -> LinkTarget<'i> {
    if let Some(linked) = index.lookup_by_short_title(target) {
        LinkTarget::Note(linked)
    } else if is_image_name(target) {
        LinkTarget::Image
    } else {
        LinkTarget::Unresolved
    }
}

/// Rewrite every wikilink in `content` as it should appear in `note`'s output.
///
/// Each occurrence is replaced at its own byte range, so identical markup in
/// several places is rewritten independently.
pub fn rewrite_links(
    content: &str,
    note: &Note,
    index: &NoteIndex,
    asset_dir_name: &str,
) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for link in wikilinks(content) {
        out.push_str(&content[last..link.range.start]);
        out.push_str(&render(&link, note, index, asset_dir_name));
        last = link.range.end;
    }
    out.push_str(&content[last..]);

    out
}

fn render(
    link: &Wikilink<'_>,
    note: &Note,
    index: &NoteIndex,
    asset_dir_name: &str,
) -> String {
    match resolve_link(link.target, index) {
        LinkTarget::Note(linked) => {
            let text = link.label.or(linked.display_title.as_deref()).unwrap_or("");
            format!("[{}]({})", text, linked.url())
        }
        LinkTarget::Image => {
            let text = link.label.unwrap_or("");
            format!("[{}]({}{}/{})", text, up_prefix(note), asset_dir_name, link.target)
        }
        LinkTarget::Unresolved => link.label.unwrap_or(link.target).to_string(),
    }
}

/// `../` repeated once per collection segment, plus once for the content root.
fn up_prefix(note: &Note) -> String {
    let nesting = note.collection_segments().count() + 1;
    "../".repeat(nesting)
}

/// Targets in `note` that resolve neither to a note nor to an image.
pub fn unresolved_links<'a>(note: &'a Note, index: &NoteIndex) -> Vec<&'a str> {
    wikilink_targets(&note.content)
        .filter(|target| matches!(resolve_link(target, index), LinkTarget::Unresolved))
        .collect()
}

//! Section-level transforms.

use std::sync::LazyLock;

use regex::Regex;

// "## Highlight", "## Highlights", "### Highlights" ... at the start of a line
static HIGHLIGHTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{2,6} Highlights*").expect("valid highlights regex"));

/// Cut `content` at the first highlights heading.
///
/// Book notes end with a section of imported highlights that is not meant to
/// be published; the heading and everything after it are dropped.
pub fn strip_highlights(content: &str) -> &str {
    match HIGHLIGHTS_RE.find(content) {
        Some(m) => &content[..m.start()],
        None => content,
    }
}

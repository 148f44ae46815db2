//! Frontmatter parsing from markdown documents.

use super::types::{Frontmatter, ParsedDocument};

const DELIMITER: &str = "---";

/// Parse frontmatter from markdown content.
///
/// Frontmatter must open the document, `---` being its first three characters:
/// ```markdown
/// ---
/// key: value
/// ---
/// # Document content
/// ```
///
/// Leading whitespace is not skipped. A document without an opening or a
/// closing delimiter has no frontmatter.
pub fn parse(content: &str) -> ParsedDocument {
    let Some(after_first) = content.strip_prefix(DELIMITER) else {
        return ParsedDocument { frontmatter: None, body: content.to_string() };
    };

    // Skip the rest of the opening line
    let after_newline = match after_first.find('\n') {
        Some(pos) => &after_first[pos + 1..],
        None => "",
    };

    let Some((block_end, body_start)) = find_closing_delimiter(after_newline) else {
        return ParsedDocument { frontmatter: None, body: content.to_string() };
    };

    let frontmatter = parse_block(&after_newline[..block_end]);
    let body = after_newline[body_start..].to_string();

    ParsedDocument { frontmatter: Some(frontmatter), body }
}

/// Find the closing `---` line.
///
/// Returns the byte offset where the delimiter line starts and the offset of
/// the first byte after it.
fn find_closing_delimiter(content: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim() == DELIMITER {
            return Some((offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

/// Parse the lines of a frontmatter block as `key: value` pairs.
fn parse_block(block: &str) -> Frontmatter {
    let mut fm = Frontmatter::default();

    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        fm.fields.insert(key.to_string(), unquote(value).to_string());
    }

    fm
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(value)
}

//! Frontmatter types and data structures.

use std::collections::HashMap;

/// Flat key/value mapping read from a note's frontmatter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// Fields as key-value pairs, values already unquoted and trimmed.
    pub fields: HashMap<String, String>,
}

impl Frontmatter {
    /// Get the raw value of a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Whether a field is present and truthy.
    ///
    /// Any non-empty value counts, except the usual spellings of "no":
    /// `false`, `no`, `off` and `0` (case-insensitive).
    pub fn is_truthy(&self, key: &str) -> bool {
        match self.get(key) {
            Some(value) => {
                let value = value.trim();
                !value.is_empty()
                    && !["false", "no", "off", "0"]
                        .iter()
                        .any(|falsy| value.eq_ignore_ascii_case(falsy))
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result of splitting frontmatter from markdown.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Parsed frontmatter (if present).
    pub frontmatter: Option<Frontmatter>,
    /// The markdown body (everything after frontmatter).
    pub body: String,
}

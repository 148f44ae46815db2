//! Frontmatter parsing.
//!
//! This module provides a line-oriented reader for the `---` delimited block at
//! the top of a note. It is deliberately not a YAML engine: every line is a flat
//! `key: value` pair and anything else is ignored.

pub mod parser;
pub mod types;

pub use parser::parse;
pub use types::{Frontmatter, ParsedDocument};

//! Index data types for publishable vault notes.

use std::path::{Path, PathBuf};

use crate::frontmatter;

/// A vault note eligible for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Path relative to the vault root; the identity key in the index.
    pub vault_path: PathBuf,
    /// File name without extension, matched against wikilink targets.
    pub short_title: String,
    /// Vault-relative path without the `.md` extension.
    pub vault_title: PathBuf,
    /// Human title from frontmatter `title:`.
    pub display_title: Option<String>,
    /// Output file name within the collection.
    pub slug: String,
    /// Output grouping; may contain `/` separators.
    pub collection: String,
    /// Full file text, frontmatter block included.
    pub content: String,
}

impl Note {
    /// Build a note from a vault file, or `None` when it does not qualify.
    ///
    /// A file qualifies when it is markdown, opens with a frontmatter block and
    /// that block declares `slug`, `collection` and a truthy `publish`. Slug
    /// and collection must be relative `/`-separated names without `.` or `..`
    /// segments.
    pub fn from_source(vault_path: &Path, content: &str) -> Option<Self> {
        if !is_markdown(vault_path) {
            return None;
        }

        let fm = frontmatter::parse(content).frontmatter?;
        let slug = fm.get("slug")?.to_string();
        let collection = fm.get("collection")?.to_string();
        if !fm.is_truthy("publish") {
            return None;
        }
        if !is_plain_relative(&slug) || !is_plain_relative(&collection) {
            tracing::warn!(
                "{}: slug '{}' in collection '{}' does not name a path inside the output directory",
                vault_path.display(),
                slug,
                collection
            );
            return None;
        }

        let short_title = vault_path.file_stem()?.to_string_lossy().into_owned();

        Some(Self {
            vault_path: vault_path.to_path_buf(),
            short_title,
            vault_title: vault_path.with_extension(""),
            display_title: fm.get("title").map(str::to_string),
            slug,
            collection,
            content: content.to_string(),
        })
    }

    /// Path of the published file relative to the output notes directory.
    pub fn output_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.collection_segments() {
            path.push(segment);
        }
        path.push(format!("{}.md", self.slug));
        path
    }

    /// Site URL of the published note.
    pub fn url(&self) -> String {
        format!("/{}/{}/", self.collection, self.slug)
    }

    /// Collection split on `/`.
    pub fn collection_segments(&self) -> impl Iterator<Item = &str> {
        self.collection.split('/')
    }
}

/// Several indexed notes sharing one short title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortTitleCollision {
    pub short_title: String,
    /// Every note path with this short title, in index order.
    pub paths: Vec<PathBuf>,
}

impl ShortTitleCollision {
    /// The path wikilinks resolve to.
    pub fn winner(&self) -> &Path {
        &self.paths[0]
    }
}

/// `/`-separated segments that are all non-empty, not `.` or `..`, and free of
/// backslashes.
fn is_plain_relative(value: &str) -> bool {
    value.split('/').all(|segment| {
        !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
    })
}

pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e == "md")
}

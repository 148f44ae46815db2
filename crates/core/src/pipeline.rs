//! Per-note content transformation.
//!
//! A [`ContentPipeline`] is an ordered list of [`Stage`]s. Each stage receives
//! the content produced by the previous one; the default list rewrites
//! wikilinks first and strips highlights sections second.

use crate::index::{Note, NoteIndex};
use crate::resolve::{rewrite_links, strip_highlights};

/// One content transform.
pub trait Stage: Send + Sync {
    /// Stage name, used in logs.
    fn name(&self) -> &'static str;

    /// Transform `content`, which belongs to `note`.
    ///
    /// Stages read the index but never modify it.
    fn apply(&self, note: &Note, index: &NoteIndex, content: String) -> String;
}

/// Rewrites wikilinks into site links, asset links or plain text.
#[derive(Debug, Clone)]
pub struct LinkRewrite {
    asset_dir_name: String,
}

impl LinkRewrite {
    pub fn new(asset_dir_name: impl Into<String>) -> Self {
        Self { asset_dir_name: asset_dir_name.into() }
    }
}

impl Stage for LinkRewrite {
    fn name(&self) -> &'static str {
        "link-rewrite"
    }

    fn apply(&self, note: &Note, index: &NoteIndex, content: String) -> String {
        rewrite_links(&content, note, index, &self.asset_dir_name)
    }
}

/// Drops a trailing highlights section.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripHighlights;

impl Stage for StripHighlights {
    fn name(&self) -> &'static str {
        "strip-highlights"
    }

    fn apply(&self, _note: &Note, _index: &NoteIndex, content: String) -> String {
        let kept = strip_highlights(&content).len();
        let mut content = content;
        content.truncate(kept);
        content
    }
}

pub struct ContentPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl ContentPipeline {
    /// Default pipeline: link rewrite, then highlights strip.
    pub fn new(asset_dir_name: impl Into<String>) -> Self {
        Self::empty().with_stage(LinkRewrite::new(asset_dir_name)).with_stage(StripHighlights)
    }

    /// Pipeline without any stage.
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage after the existing ones.
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over a copy of `note`.
    pub fn process(&self, note: &Note, index: &NoteIndex) -> Note {
        let content = self
            .stages
            .iter()
            .fold(note.content.clone(), |content, stage| stage.apply(note, index, content));

        Note { content, ..note.clone() }
    }
}

impl std::fmt::Debug for ContentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentPipeline").field("stages", &self.stage_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn note(path: &str, fm: &str, body: &str) -> Note {
        let text = format!("---\n{fm}\npublish: true\n---\n{body}");
        Note::from_source(Path::new(path), &text).unwrap()
    }

    fn index() -> NoteIndex {
        let mut index = NoteIndex::new();
        index.upsert(note("foo.md", "title: Foo\nslug: bar\ncollection: posts", "Foo body"));
        index
    }

    const BOOK: &str = concat!(
        "Read [[foo]] and saw [[cover.jpg]] and [[nothing]].\n\n",
        "## Highlights\n",
        "- [[foo]]\n",
    );

    #[test]
    fn process_runs_stages_in_order() {
        let index = index();
        let book = note("book.md", "slug: book\ncollection: books", BOOK);
        let out = ContentPipeline::new("assets").process(&book, &index);

        assert!(out.content.ends_with(
            "Read [Foo](/posts/bar/) and saw [](../../assets/cover.jpg) and nothing.\n\n"
        ));
        assert!(out.content.starts_with("---\nslug: book"));
        assert_eq!(out.slug, "book");
    }

    #[test]
    fn process_does_not_touch_input_or_index() {
        let index = index();
        let book = note("book.md", "slug: book\ncollection: books", BOOK);
        let before = book.clone();
        let _ = ContentPipeline::new("assets").process(&book, &index);

        assert_eq!(book, before);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn process_is_idempotent() {
        let index = index();
        let pipeline = ContentPipeline::new("assets");
        let book = note("book.md", "slug: book\ncollection: books", BOOK);

        let first = pipeline.process(&book, &index);
        let second = pipeline.process(&first, &index);
        assert_eq!(first.content, second.content);
    }

    #[test]
    fn default_pipeline_output() {
        let index = index();
        let book = note(
            "reading/book.md",
            "title: Book\nslug: book\ncollection: library/books",
            BOOK,
        );
        let out = ContentPipeline::new("images").process(&book, &index);

        insta::assert_snapshot!(out.content.trim_end(), @r"
        ---
        title: Book
        slug: book
        collection: library/books
        publish: true
        ---
        Read [Foo](/posts/bar/) and saw [](../../../images/cover.jpg) and nothing.
        ");
    }

    struct Shout;

    impl Stage for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn apply(&self, _note: &Note, _index: &NoteIndex, content: String) -> String {
            content.to_uppercase()
        }
    }

    #[test]
    fn extra_stages_run_last() {
        let index = index();
        let pipeline = ContentPipeline::new("assets").with_stage(Shout);
        assert_eq!(pipeline.stage_names(), vec!["link-rewrite", "strip-highlights", "shout"]);

        let src = note("s.md", "slug: s\ncollection: posts", "see [[foo]]");
        let out = pipeline.process(&src, &index);
        assert!(out.content.ends_with("SEE [FOO](/POSTS/BAR/)"));
    }
}

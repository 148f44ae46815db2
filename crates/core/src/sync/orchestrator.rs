//! Full and incremental synchronization of the vault into the output tree.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::error::SyncError;
use super::watch::ChangeEvent;
use super::writer::OutputWriter;
use crate::config::ResolvedConfig;
use crate::index::types::is_markdown;
use crate::index::{Note, NoteIndex, ShortTitleCollision};
use crate::pipeline::ContentPipeline;
use crate::resolve::is_image_name;
use crate::vault::{VaultWalker, WalkedFile};

/// Lifecycle of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Indexing,
    ImageSync,
    Watching,
}

/// Statistics from a full sync.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Markdown files discovered in the vault.
    pub files_found: usize,
    /// Files that qualified for publishing.
    pub notes_indexed: usize,
    /// Notes written to the output tree.
    pub notes_written: usize,
    /// Images copied to the asset directory.
    pub images_copied: usize,
    /// Short titles shared by several notes.
    pub collisions: Vec<ShortTitleCollision>,
    /// Per-file failures; none of them stopped the sync.
    pub failures: Vec<SyncError>,
}

/// What an incremental update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The note was (re)published, along with the notes linking to it.
    Published { path: PathBuf, dependents: usize, images: usize },
    /// A previously published note stopped qualifying or was deleted.
    Unpublished { path: PathBuf, dependents: usize },
    /// An image referenced by some note was copied.
    ImageCopied { path: PathBuf },
    /// A folder appeared; the files below it were handled one by one.
    FolderAdded { path: PathBuf, published: usize, images: usize },
    /// A folder disappeared, taking these published notes with it.
    FolderRemoved { path: PathBuf, unpublished: usize },
    /// Nothing to do for this path.
    Skipped { path: PathBuf },
}

/// Drives the note index and the output tree.
///
/// The orchestrator owns the [`NoteIndex`]; all mutations go through its
/// `&mut self` methods, one event at a time.
pub struct SyncOrchestrator {
    /// Vault root as configured.
    vault_root: PathBuf,
    walker: VaultWalker,
    writer: OutputWriter,
    pipeline: ContentPipeline,
    index: NoteIndex,
    state: SyncState,
}

impl SyncOrchestrator {
    pub fn new(config: &ResolvedConfig) -> Result<Self, SyncError> {
        let walker =
            VaultWalker::with_exclusions(&config.vault_root, config.excluded_folders.clone())?;

        Ok(Self {
            vault_root: config.vault_root.clone(),
            walker,
            writer: OutputWriter::new(&config.notes_dir, &config.images_dir),
            pipeline: ContentPipeline::new(config.asset_dir_name()),
            index: NoteIndex::new(),
            state: SyncState::Uninitialized,
        })
    }

    /// Replace the default content pipeline.
    pub fn with_pipeline(mut self, pipeline: ContentPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn index(&self) -> &NoteIndex {
        &self.index
    }

    pub fn pipeline(&self) -> &ContentPipeline {
        &self.pipeline
    }

    /// Canonical vault root, the directory to watch.
    pub fn watch_root(&self) -> &Path {
        self.walker.root()
    }

    /// Read every markdown file in the vault into the index.
    ///
    /// Nothing is written. Unreadable files end up in `failures`. Entries from
    /// an earlier run are discarded first.
    pub fn build_index(&mut self) -> Result<SyncReport, SyncError> {
        self.state = SyncState::Indexing;
        self.index = NoteIndex::new();
        let mut report = SyncReport::default();

        let files = self.walker.walk()?;
        report.files_found = files.len();

        let parsed: Vec<Result<Option<Note>, SyncError>> =
            files.par_iter().map(read_note).collect();

        for result in parsed {
            match result {
                Ok(Some(note)) => {
                    self.index.upsert(note);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("{}", e);
                    report.failures.push(e);
                }
            }
        }
        report.notes_indexed = self.index.len();

        report.collisions = self.index.collisions();
        for collision in &report.collisions {
            tracing::warn!(
                "[[{}]] is ambiguous: {} notes share this name, links resolve to {}",
                collision.short_title,
                collision.paths.len(),
                collision.winner().display()
            );
        }

        Ok(report)
    }

    /// Index the vault, publish every note, then copy referenced images.
    ///
    /// The phases run strictly one after the other: image relevance depends on
    /// the complete index.
    pub fn full_sync(&mut self) -> Result<SyncReport, SyncError> {
        let mut report = self.build_index()?;

        let this = &*self;
        let notes: Vec<&Note> = this.index.all().collect();
        let written: Vec<Result<PathBuf, SyncError>> = notes
            .par_iter()
            .map(|note| this.writer.write_note(&this.pipeline.process(note, &this.index)))
            .collect();
        tally(written, &mut report.notes_written, &mut report.failures);

        self.state = SyncState::ImageSync;
        let this = &*self;
        let images = this.walker.walk_images()?;
        let copied: Vec<Result<PathBuf, SyncError>> = images
            .par_iter()
            .filter_map(|image| this.copy_if_referenced(image))
            .collect();
        tally(copied, &mut report.images_copied, &mut report.failures);

        tracing::info!(
            "Synced {} notes and {} images ({} failures)",
            report.notes_written,
            report.images_copied,
            report.failures.len()
        );
        Ok(report)
    }

    /// Handle one coalesced change event.
    pub fn handle_event(&mut self, event: &ChangeEvent) -> Result<UpdateOutcome, SyncError> {
        match event {
            ChangeEvent::Changed(path) => self.handle_change(path),
            ChangeEvent::Removed(path) => self.handle_removal(path),
        }
    }

    /// Bring the output up to date after a file was added or changed.
    ///
    /// A qualifying note is re-indexed and published together with every note
    /// linking to it. Anything else is treated as a candidate image.
    pub fn handle_change(&mut self, path: &Path) -> Result<UpdateOutcome, SyncError> {
        let Some(relative) = self.vault_relative(path) else {
            return Ok(UpdateOutcome::Skipped { path: path.to_path_buf() });
        };
        if self.walker.is_ignored(&relative) {
            return Ok(UpdateOutcome::Skipped { path: relative });
        }

        let absolute = self.walker.root().join(&relative);
        if absolute.is_dir() {
            return self.add_folder(&relative);
        }
        let note = if is_markdown(&relative) {
            let file = WalkedFile {
                absolute_path: absolute.clone(),
                relative_path: relative.clone(),
            };
            read_note(&file)?
        } else {
            None
        };

        match note {
            Some(note) => self.publish(note),
            None if self.index.contains(&relative) => self.unpublish(&relative),
            None => self.copy_candidate_image(&relative, &absolute),
        }
    }

    /// Drop a deleted file's note and output.
    ///
    /// A path that is not itself indexed may be a folder: every note below it
    /// is unpublished.
    pub fn handle_removal(&mut self, path: &Path) -> Result<UpdateOutcome, SyncError> {
        let Some(relative) = self.vault_relative(path) else {
            return Ok(UpdateOutcome::Skipped { path: path.to_path_buf() });
        };
        if self.index.contains(&relative) {
            return self.unpublish(&relative);
        }

        let below = self.index.paths_under(&relative);
        if below.is_empty() {
            return Ok(UpdateOutcome::Skipped { path: relative });
        }
        let mut unpublished = 0;
        for note in &below {
            match self.unpublish(note) {
                Ok(_) => unpublished += 1,
                Err(e) => tracing::warn!("{}", e),
            }
        }
        Ok(UpdateOutcome::FolderRemoved { path: relative, unpublished })
    }

    /// Consume change events until the source is exhausted.
    ///
    /// Failures are logged and never end the loop. Returns the number of
    /// events handled.
    pub fn watch(&mut self, events: impl IntoIterator<Item = ChangeEvent>) -> usize {
        self.state = SyncState::Watching;
        tracing::info!("Watching {} for changes...", self.vault_root.display());

        let mut handled = 0;
        for event in events {
            match self.handle_event(&event) {
                Ok(outcome) => tracing::debug!("{}", outcome),
                Err(e) => tracing::warn!("{}", e),
            }
            handled += 1;
        }
        handled
    }

    /// Path relative to the vault root, for absolute or already relative input.
    pub fn vault_relative(&self, path: &Path) -> Option<PathBuf> {
        if path.is_relative() {
            return Some(path.to_path_buf());
        }
        path.strip_prefix(self.walker.root())
            .or_else(|_| path.strip_prefix(&self.vault_root))
            .ok()
            .map(Path::to_path_buf)
    }

    /// Handle the files of a folder that appeared in one piece, e.g. moved in.
    ///
    /// Notes already in the index get their own events and are left alone.
    /// Notes go first so that images they reference are seen as referenced.
    fn add_folder(&mut self, relative: &Path) -> Result<UpdateOutcome, SyncError> {
        let files =
            self.walker.walk_subtree(relative, |p| is_markdown(p) || is_image_file(p))?;
        let (notes, images): (Vec<WalkedFile>, Vec<WalkedFile>) =
            files.into_iter().partition(|f| is_markdown(&f.relative_path));
        let fresh: Vec<PathBuf> = notes
            .into_iter()
            .map(|f| f.relative_path)
            .filter(|p| !self.index.contains(p))
            .collect();

        let mut published = 0;
        for path in &fresh {
            match self.handle_change(path) {
                Ok(UpdateOutcome::Published { .. }) => published += 1,
                Ok(_) => {}
                Err(e) => tracing::warn!("{}", e),
            }
        }

        let mut copied = 0;
        for image in &images {
            match self.copy_if_referenced(image) {
                Some(Ok(_)) => copied += 1,
                Some(Err(e)) => tracing::warn!("{}", e),
                None => {}
            }
        }

        Ok(UpdateOutcome::FolderAdded { path: relative.to_path_buf(), published, images: copied })
    }

    fn publish(&mut self, note: Note) -> Result<UpdateOutcome, SyncError> {
        let path = note.vault_path.clone();
        let short_title = note.short_title.clone();

        let previous = self.index.upsert(note);
        let Some(current) = self.index.get(&path) else {
            return Ok(UpdateOutcome::Skipped { path });
        };

        // Slug or collection changed: the old output would linger
        if let Some(previous) = previous
            && previous.output_path() != current.output_path()
        {
            self.writer.remove_note(&previous)?;
        }
        self.writer.write_note(&self.pipeline.process(current, &self.index))?;

        let dependents = self.refresh_dependents(&short_title, &path);
        let images = self.copy_images_referenced_by(&path);

        Ok(UpdateOutcome::Published { path, dependents, images })
    }

    fn unpublish(&mut self, relative: &Path) -> Result<UpdateOutcome, SyncError> {
        let Some(removed) = self.index.remove(relative) else {
            return Ok(UpdateOutcome::Skipped { path: relative.to_path_buf() });
        };
        self.writer.remove_note(&removed)?;

        let dependents = self.refresh_dependents(&removed.short_title, relative);
        Ok(UpdateOutcome::Unpublished { path: relative.to_path_buf(), dependents })
    }

    /// Rewrite every note linking to `short_title`, except `origin`.
    fn refresh_dependents(&self, short_title: &str, origin: &Path) -> usize {
        let mut refreshed = 0;
        for path in self.index.dependents_of(short_title) {
            if path == origin {
                continue;
            }
            let Some(dependent) = self.index.get(&path) else {
                continue;
            };
            match self.writer.write_note(&self.pipeline.process(dependent, &self.index)) {
                Ok(_) => refreshed += 1,
                Err(e) => tracing::warn!("{}", e),
            }
        }
        refreshed
    }

    /// Copy every vault image whose file name appears in the note at `path`.
    fn copy_images_referenced_by(&self, path: &Path) -> usize {
        let Some(note) = self.index.get(path) else {
            return 0;
        };
        let images = match self.walker.walk_images() {
            Ok(images) => images,
            Err(e) => {
                tracing::warn!("{}", e);
                return 0;
            }
        };

        let mut copied = 0;
        for image in &images {
            if !note.content.contains(file_name(&image.relative_path)) {
                continue;
            }
            match self.copy_image(image) {
                Ok(_) => copied += 1,
                Err(e) => tracing::warn!("{}", e),
            }
        }
        copied
    }

    fn copy_candidate_image(
        &self,
        relative: &Path,
        absolute: &Path,
    ) -> Result<UpdateOutcome, SyncError> {
        let image = WalkedFile {
            absolute_path: absolute.to_path_buf(),
            relative_path: relative.to_path_buf(),
        };
        match self.copy_if_referenced(&image) {
            Some(copied) => {
                copied?;
                Ok(UpdateOutcome::ImageCopied { path: relative.to_path_buf() })
            }
            None => Ok(UpdateOutcome::Skipped { path: relative.to_path_buf() }),
        }
    }

    /// Copy an image when some indexed note mentions its file name.
    ///
    /// `None` means the file is not an image or nothing references it.
    fn copy_if_referenced(&self, image: &WalkedFile) -> Option<Result<PathBuf, SyncError>> {
        let name = file_name(&image.relative_path);
        if !is_image_name(name) || !self.index.references_file(name) {
            return None;
        }
        Some(self.copy_image(image))
    }

    fn copy_image(&self, image: &WalkedFile) -> Result<PathBuf, SyncError> {
        self.writer.copy_image(&image.absolute_path, file_name(&image.relative_path))
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published { path, dependents, images } => write!(
                f,
                "published {} ({} dependents, {} images)",
                path.display(),
                dependents,
                images
            ),
            Self::Unpublished { path, dependents } => {
                write!(f, "unpublished {} ({} dependents)", path.display(), dependents)
            }
            Self::ImageCopied { path } => write!(f, "copied {}", path.display()),
            Self::FolderAdded { path, published, images } => write!(
                f,
                "added folder {} ({} published, {} images)",
                path.display(),
                published,
                images
            ),
            Self::FolderRemoved { path, unpublished } => {
                write!(f, "removed folder {} ({} unpublished)", path.display(), unpublished)
            }
            Self::Skipped { path } => write!(f, "skipped {}", path.display()),
        }
    }
}

fn read_note(file: &WalkedFile) -> Result<Option<Note>, SyncError> {
    let content = fs::read_to_string(&file.absolute_path).map_err(|e| SyncError::Read {
        path: file.absolute_path.clone(),
        source: e,
    })?;
    Ok(Note::from_source(&file.relative_path, &content))
}

fn is_image_file(path: &Path) -> bool {
    is_image_name(file_name(path))
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn tally(
    results: Vec<Result<PathBuf, SyncError>>,
    ok: &mut usize,
    failures: &mut Vec<SyncError>,
) {
    for result in results {
        match result {
            Ok(_) => *ok += 1,
            Err(e) => {
                tracing::warn!("{}", e);
                failures.push(e);
            }
        }
    }
}

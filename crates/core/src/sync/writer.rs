//! Output tree writes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::error::SyncError;
use crate::index::Note;

/// Writes published notes and copied images under the output directories.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    notes_dir: PathBuf,
    images_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(notes_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self { notes_dir: notes_dir.into(), images_dir: images_dir.into() }
    }

    /// Absolute output path of a note: `<notes_dir>/<collection>/<slug>.md`.
    pub fn note_target(&self, note: &Note) -> PathBuf {
        self.notes_dir.join(note.output_path())
    }

    /// `note_target`, provided the relative part stays below `notes_dir`.
    fn contained_target(&self, note: &Note) -> Result<PathBuf, SyncError> {
        let relative = note.output_path();
        if relative.components().all(|c| matches!(c, Component::Normal(_))) {
            Ok(self.notes_dir.join(relative))
        } else {
            Err(SyncError::OutsideOutput { note: note.vault_path.clone(), target: relative })
        }
    }

    /// Absolute output path of an image: `<images_dir>/<file name>`.
    pub fn image_target(&self, file_name: &str) -> PathBuf {
        self.images_dir.join(file_name)
    }

    /// Write a processed note, creating collection directories as needed.
    pub fn write_note(&self, note: &Note) -> Result<PathBuf, SyncError> {
        let target = self.contained_target(note)?;
        tracing::info!("Writing {} to {}", note.vault_path.display(), target.display());

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SyncError::Write { path: parent.to_path_buf(), source: e })?;
        }
        fs::write(&target, &note.content)
            .map_err(|e| SyncError::Write { path: target.clone(), source: e })?;

        Ok(target)
    }

    /// Delete a note's output file. A file that is already gone is not an error.
    pub fn remove_note(&self, note: &Note) -> Result<bool, SyncError> {
        let target = self.contained_target(note)?;
        match fs::remove_file(&target) {
            Ok(()) => {
                tracing::info!("Removed {}", target.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SyncError::Remove { path: target, source: e }),
        }
    }

    /// Copy a vault image into the flat images directory.
    pub fn copy_image(&self, source: &Path, file_name: &str) -> Result<PathBuf, SyncError> {
        let target = self.image_target(file_name);
        tracing::info!("Copying {}...", file_name);

        fs::create_dir_all(&self.images_dir)
            .map_err(|e| SyncError::Write { path: self.images_dir.clone(), source: e })?;
        fs::copy(source, &target).map_err(|e| SyncError::Copy {
            from: source.to_path_buf(),
            to: target.clone(),
            source: e,
        })?;

        Ok(target)
    }
}

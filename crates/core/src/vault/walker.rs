//! Recursive vault directory walker.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::resolve::is_image_name;

#[derive(Debug, Error)]
pub enum VaultWalkerError {
    #[error("vault root does not exist: {0}")]
    MissingRoot(String),

    #[error("failed to walk vault directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),
}

/// Information about a discovered vault file.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Absolute path to the file.
    pub absolute_path: PathBuf,
    /// Path relative to vault root.
    pub relative_path: PathBuf,
}

/// Walker for discovering notes and images in a vault.
#[derive(Debug)]
pub struct VaultWalker {
    root: PathBuf,
    /// Vault-relative folders pruned from every walk.
    excluded_folders: Vec<PathBuf>,
}

impl VaultWalker {
    /// Walker over the whole vault.
    pub fn new(root: &Path) -> Result<Self, VaultWalkerError> {
        Self::with_exclusions(root, Vec::new())
    }

    /// Walker that also prunes `excluded_folders`.
    ///
    /// Folders are vault-relative, or absolute paths below the vault root as
    /// produced by `{{vault_root}}/...` in the config.
    pub fn with_exclusions(
        root: &Path,
        excluded_folders: Vec<PathBuf>,
    ) -> Result<Self, VaultWalkerError> {
        let configured = root;
        let root = configured
            .canonicalize()
            .map_err(|_| VaultWalkerError::MissingRoot(configured.display().to_string()))?;

        if !root.is_dir() {
            return Err(VaultWalkerError::MissingRoot(root.display().to_string()));
        }

        let excluded_folders = excluded_folders
            .into_iter()
            .map(|p| {
                if !p.is_absolute() {
                    return p;
                }
                p.strip_prefix(&root)
                    .or_else(|_| p.strip_prefix(configured))
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| p.clone())
            })
            .collect();

        Ok(Self { root, excluded_folders })
    }

    /// Markdown files, sorted by vault-relative path.
    pub fn walk(&self) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        self.walk_matching(is_markdown_file)
    }

    /// Files with a publishable image extension.
    pub fn walk_images(&self) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        self.walk_matching(is_image_file)
    }

    /// Every file accepted by `keep`, outside hidden, tool and excluded folders.
    pub fn walk_matching(
        &self,
        keep: impl Fn(&Path) -> bool,
    ) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        self.walk_subtree(Path::new(""), keep)
    }

    /// Like [`walk_matching`](Self::walk_matching), restricted to the folder at
    /// `relative` (a vault-relative path).
    pub fn walk_subtree(
        &self,
        relative: &Path,
        keep: impl Fn(&Path) -> bool,
    ) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        let start = if relative.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        };
        let mut files = Vec::new();

        for entry in WalkDir::new(start)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e))
        {
            let entry = entry.map_err(|e| {
                VaultWalkerError::WalkError(self.root.display().to_string(), e)
            })?;

            let path = entry.path();
            if !path.is_file() || !keep(path) {
                continue;
            }

            let relative_path =
                path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();

            files.push(WalkedFile { absolute_path: path.to_path_buf(), relative_path });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    /// Whether a vault-relative path lies inside a hidden or excluded folder.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        relative.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name.starts_with('.') || is_skipped_dir(&name)
        }) || self.in_excluded_folder(relative)
    }

    /// Pruning filter for `WalkDir`; the folder a walk starts from is kept.
    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        name.starts_with('.')
            || is_skipped_dir(&name)
            || entry
                .path()
                .strip_prefix(&self.root)
                .is_ok_and(|relative| self.in_excluded_folder(relative))
    }

    fn in_excluded_folder(&self, relative: &Path) -> bool {
        self.excluded_folders.iter().any(|excluded| relative.starts_with(excluded))
    }

    /// Canonical vault root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_skipped_dir(name: &str) -> bool {
    matches!(name, "node_modules" | "target" | "__pycache__" | "venv")
}

fn is_markdown_file(path: &Path) -> bool {
    crate::index::types::is_markdown(path)
}

fn is_image_file(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(is_image_name)
}

//! In-memory note index.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use super::types::{Note, ShortTitleCollision};
use crate::resolve::wikilink_targets;

/// Mapping from vault-relative path to published note.
///
/// Entries are kept in path order, which makes short-title lookups
/// deterministic: when several notes share a short title the one with the
/// smallest path wins. Alongside the notes the index keeps a reverse map from
/// wikilink target to the notes linking to it.
#[derive(Debug, Default, Clone)]
pub struct NoteIndex {
    notes: BTreeMap<PathBuf, Note>,
    outgoing: HashMap<PathBuf, BTreeSet<String>>,
    incoming: HashMap<String, BTreeSet<PathBuf>>,
}

impl NoteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `note.vault_path`.
    pub fn upsert(&mut self, note: Note) -> Option<Note> {
        let path = note.vault_path.clone();
        self.unlink(&path);

        let targets: BTreeSet<String> =
            wikilink_targets(&note.content).map(str::to_string).collect();
        for target in &targets {
            self.incoming.entry(target.clone()).or_default().insert(path.clone());
        }
        self.outgoing.insert(path.clone(), targets);

        self.notes.insert(path, note)
    }

    /// Drop the entry for a path.
    pub fn remove(&mut self, path: &Path) -> Option<Note> {
        self.unlink(path);
        self.notes.remove(path)
    }

    fn unlink(&mut self, path: &Path) {
        let Some(targets) = self.outgoing.remove(path) else {
            return;
        };
        for target in targets {
            if let Some(sources) = self.incoming.get_mut(&target) {
                sources.remove(path);
                if sources.is_empty() {
                    self.incoming.remove(&target);
                }
            }
        }
    }

    pub fn get(&self, path: &Path) -> Option<&Note> {
        self.notes.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.notes.contains_key(path)
    }

    /// Paths of indexed notes inside the folder `prefix`, in index order.
    pub fn paths_under(&self, prefix: &Path) -> Vec<PathBuf> {
        self.notes.keys().filter(|path| path.starts_with(prefix)).cloned().collect()
    }

    /// First note, in index order, whose short title equals `name`.
    pub fn lookup_by_short_title(&self, name: &str) -> Option<&Note> {
        self.notes.values().find(|note| note.short_title == name)
    }

    /// All entries in index order.
    pub fn all(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Short titles claimed by more than one note.
    pub fn collisions(&self) -> Vec<ShortTitleCollision> {
        let mut by_title: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
        for note in self.notes.values() {
            by_title
                .entry(note.short_title.as_str())
                .or_default()
                .push(note.vault_path.clone());
        }

        by_title
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(title, paths)| ShortTitleCollision { short_title: title.to_string(), paths })
            .collect()
    }

    /// Paths of notes containing a wikilink to `short_title`, in path order.
    pub fn dependents_of(&self, short_title: &str) -> Vec<PathBuf> {
        self.incoming
            .get(short_title)
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether any indexed note's raw content contains `name`.
    pub fn references_file(&self, name: &str) -> bool {
        self.notes.values().any(|note| note.content.contains(name))
    }
}

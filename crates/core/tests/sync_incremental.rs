//! Incremental updates driven by change events.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vaultsync_core::config::{LoggingConfig, ResolvedConfig, WatchConfig};
use vaultsync_core::sync::{ChangeEvent, SyncOrchestrator, SyncState, UpdateOutcome};

struct Harness {
    _tmp: TempDir,
    vault: PathBuf,
    notes: PathBuf,
    images: PathBuf,
}

impl Harness {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let vault = tmp.path().join("vault");
        let notes = tmp.path().join("out/content");
        let images = tmp.path().join("out/images");
        fs::create_dir_all(&vault).unwrap();
        Self { _tmp: tmp, vault, notes, images }
    }

    fn config(&self) -> ResolvedConfig {
        ResolvedConfig {
            active_profile: "test".to_string(),
            vault_root: self.vault.clone(),
            notes_dir: self.notes.clone(),
            images_dir: self.images.clone(),
            excluded_folders: Vec::new(),
            watch: WatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    fn synced(&self) -> SyncOrchestrator {
        let mut sync = SyncOrchestrator::new(&self.config()).unwrap();
        sync.full_sync().unwrap();
        sync
    }

    fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.vault.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn output(&self, rel: &str) -> Option<String> {
        fs::read_to_string(self.notes.join(rel)).ok()
    }
}

fn published(title: &str, slug: &str, body: &str) -> String {
    format!("---\ntitle: {title}\nslug: {slug}\ncollection: posts\npublish: true\n---\n{body}")
}

#[test]
fn changed_note_is_republished() {
    let h = Harness::new();
    let path = h.write("A.md", &published("A", "a", "first"));
    let mut sync = h.synced();

    fs::write(&path, published("A", "a", "second")).unwrap();
    let outcome = sync.handle_change(&path).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Published { path: PathBuf::from("A.md"), dependents: 0, images: 0 }
    );
    assert!(h.output("posts/a.md").unwrap().ends_with("second"));
    assert!(sync.index().get(Path::new("A.md")).unwrap().content.ends_with("second"));
}

#[test]
fn relative_paths_are_accepted() {
    let h = Harness::new();
    let mut sync = h.synced();
    h.write("sub/B.md", &published("B", "b", "hello"));

    let outcome = sync.handle_change(Path::new("sub/B.md")).unwrap();

    assert!(matches!(outcome, UpdateOutcome::Published { .. }));
    assert!(h.output("posts/b.md").is_some());
}

#[test]
fn new_note_re_resolves_dependents() {
    let h = Harness::new();
    h.write("A.md", &published("A", "a", "Read [[B]] next."));
    let mut sync = h.synced();
    assert!(h.output("posts/a.md").unwrap().ends_with("Read B next."));

    let b = h.write("B.md", &published("Bee", "b", "I am B"));
    let outcome = sync.handle_change(&b).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Published { path: PathBuf::from("B.md"), dependents: 1, images: 0 }
    );
    assert!(h.output("posts/a.md").unwrap().ends_with("Read [Bee](/posts/b/) next."));
}

#[test]
fn ineligible_file_routes_to_image_copy() {
    let h = Harness::new();
    let mut sync = h.synced();

    let draft = h.write("Draft.md", "---\nslug: d\ncollection: posts\n---\nnot yet");
    let outcome = sync.handle_change(&draft).unwrap();

    assert_eq!(outcome, UpdateOutcome::Skipped { path: PathBuf::from("Draft.md") });
    assert!(h.output("posts/d.md").is_none());
    assert!(sync.index().is_empty());
}

#[test]
fn referenced_image_is_copied_on_add() {
    let h = Harness::new();
    h.write("A.md", &published("A", "a", "![[shot.png]]"));
    let mut sync = h.synced();
    assert!(!h.images.join("shot.png").exists());

    let image = h.write("attachments/shot.png", "png");
    let outcome = sync.handle_change(&image).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::ImageCopied { path: PathBuf::from("attachments/shot.png") }
    );
    assert!(h.images.join("shot.png").exists());

    let stray = h.write("attachments/stray.png", "png");
    let outcome = sync.handle_change(&stray).unwrap();
    assert!(matches!(outcome, UpdateOutcome::Skipped { .. }));
    assert!(!h.images.join("stray.png").exists());
}

#[test]
fn publishing_a_note_copies_its_images() {
    let h = Harness::new();
    h.write("img/diagram.webp", "webp");
    let mut sync = h.synced();

    let note = h.write("A.md", &published("A", "a", "[[diagram.webp|Diagram]]"));
    let outcome = sync.handle_change(&note).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Published { path: PathBuf::from("A.md"), dependents: 0, images: 1 }
    );
    assert!(h.images.join("diagram.webp").exists());
    assert!(h.output("posts/a.md").unwrap().ends_with("[Diagram](../../images/diagram.webp)"));
}

#[test]
fn removing_last_reference_prevents_copy() {
    let h = Harness::new();
    let a = h.write("A.md", &published("A", "a", "[[late.jpg]]"));
    let mut sync = h.synced();

    sync.handle_removal(&a).unwrap();
    fs::remove_file(&a).unwrap();

    let image = h.write("late.jpg", "jpg");
    let outcome = sync.handle_change(&image).unwrap();

    assert!(matches!(outcome, UpdateOutcome::Skipped { .. }));
    assert!(!h.images.join("late.jpg").exists());
}

#[test]
fn removed_note_is_unpublished_and_dependents_degrade() {
    let h = Harness::new();
    h.write("A.md", &published("A", "a", "See [[B|the B note]]."));
    let b = h.write("B.md", &published("B", "b", "B"));
    let mut sync = h.synced();
    assert!(h.output("posts/a.md").unwrap().ends_with("See [the B note](/posts/b/)."));

    fs::remove_file(&b).unwrap();
    let outcome = sync.handle_event(&ChangeEvent::Removed(b.clone())).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Unpublished { path: PathBuf::from("B.md"), dependents: 1 }
    );
    assert!(h.output("posts/b.md").is_none());
    assert!(h.output("posts/a.md").unwrap().ends_with("See the B note."));
}

#[test]
fn note_that_stops_qualifying_is_unpublished() {
    let h = Harness::new();
    let a = h.write("A.md", &published("A", "a", "body"));
    let mut sync = h.synced();
    assert!(h.output("posts/a.md").is_some());

    fs::write(&a, "---\nslug: a\ncollection: posts\npublish: false\n---\nbody").unwrap();
    let outcome = sync.handle_change(&a).unwrap();

    assert!(matches!(outcome, UpdateOutcome::Unpublished { .. }));
    assert!(h.output("posts/a.md").is_none());
    assert!(sync.index().is_empty());
}

#[test]
fn slug_change_removes_old_output() {
    let h = Harness::new();
    let a = h.write("A.md", &published("A", "old-slug", "body"));
    let mut sync = h.synced();

    fs::write(&a, published("A", "new-slug", "body")).unwrap();
    sync.handle_change(&a).unwrap();

    assert!(h.output("posts/old-slug.md").is_none());
    assert!(h.output("posts/new-slug.md").is_some());
}

#[test]
fn hidden_paths_are_skipped() {
    let h = Harness::new();
    let mut sync = h.synced();

    let hidden = h.write(".obsidian/Note.md", &published("H", "h", ""));
    let outcome = sync.handle_change(&hidden).unwrap();

    assert!(matches!(outcome, UpdateOutcome::Skipped { .. }));
    assert!(h.output("posts/h.md").is_none());
}

#[test]
fn watch_loop_survives_failures() {
    let h = Harness::new();
    let mut sync = h.synced();
    let good = h.write("Good.md", &published("G", "g", "ok"));

    let events = vec![
        ChangeEvent::Changed(h.vault.join("Vanished.md")),
        ChangeEvent::Changed(good),
        ChangeEvent::Removed(h.vault.join("Unknown.md")),
    ];
    let handled = sync.watch(events);

    assert_eq!(handled, 3);
    assert_eq!(sync.state(), SyncState::Watching);
    assert!(h.output("posts/g.md").is_some());
}

#[test]
fn read_failure_is_reported_per_file() {
    let h = Harness::new();
    let mut sync = h.synced();

    let err = sync.handle_change(&h.vault.join("Vanished.md")).unwrap_err();
    assert!(err.is_per_file());
}

#[test]
fn folder_moved_into_vault_is_published() {
    let h = Harness::new();
    let mut sync = h.synced();

    let staging = h._tmp.path().join("staging/trip");
    fs::create_dir_all(&staging).unwrap();
    fs::write(staging.join("Day1.md"), published("Day 1", "day1", "![[beach.png]]")).unwrap();
    fs::write(staging.join("Notes.md"), "no frontmatter").unwrap();
    fs::write(staging.join("beach.png"), b"png").unwrap();

    // A move produces a single event for the folder itself
    let trip = h.vault.join("trip");
    fs::rename(&staging, &trip).unwrap();
    let outcome = sync.handle_event(&ChangeEvent::Changed(trip)).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::FolderAdded { path: PathBuf::from("trip"), published: 1, images: 1 }
    );
    assert!(sync.index().contains(Path::new("trip/Day1.md")));
    assert!(h.output("posts/day1.md").unwrap().ends_with("![](../../images/beach.png)"));
    assert!(h.images.join("beach.png").exists());
}

#[test]
fn folder_moved_out_of_vault_is_unpublished() {
    let h = Harness::new();
    h.write("trip/Day1.md", &published("Day 1", "day1", "one"));
    h.write("trip/later/Day2.md", &published("Day 2", "day2", "two"));
    h.write("Trips.md", &published("Trips", "trips", "See [[Day1]]"));
    let mut sync = h.synced();
    assert!(h.output("posts/trips.md").unwrap().ends_with("See [Day 1](/posts/day1/)"));

    let trip = h.vault.join("trip");
    fs::rename(&trip, h._tmp.path().join("trip")).unwrap();
    let outcome = sync.handle_event(&ChangeEvent::Removed(trip)).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::FolderRemoved { path: PathBuf::from("trip"), unpublished: 2 }
    );
    assert!(h.output("posts/day1.md").is_none());
    assert!(h.output("posts/day2.md").is_none());
    assert_eq!(sync.index().len(), 1);
    assert!(h.output("posts/trips.md").unwrap().ends_with("See Day1"));
}

#[test]
fn escaping_slug_is_never_written() {
    let h = Harness::new();
    let mut sync = h.synced();
    let outside = h._tmp.path().join("outside");

    let evil = h.write(
        "Evil.md",
        &format!("---\nslug: {}\ncollection: posts\npublish: true\n---\n", outside.display()),
    );
    let outcome = sync.handle_change(&evil).unwrap();

    assert!(matches!(outcome, UpdateOutcome::Skipped { .. }));
    assert!(sync.index().is_empty());
    assert!(!h._tmp.path().join("outside.md").exists());
}

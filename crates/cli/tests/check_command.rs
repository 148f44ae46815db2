use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn write_config(root: &Path) -> std::path::PathBuf {
    let cfg = root.join("config.toml");
    write_file(
        &cfg,
        &format!(
            r#"
version = 1
[profiles.default]
vault_root = "{}"
notes_dir = "{}"
images_dir = "{}"
"#,
            root.join("vault").display(),
            root.join("out/notes").display(),
            root.join("out/images").display(),
        ),
    );
    cfg
}

fn published(slug: &str, body: &str) -> String {
    format!("---\nslug: {slug}\ncollection: notes\npublish: true\n---\n{body}")
}

#[test]
fn check_reports_unresolved_links_without_writing() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let cfg = write_config(root);
    write_file(&root.join("vault/a.md"), &published("a", "links to [[missing]] and [[b]]"));
    write_file(&root.join("vault/b.md"), &published("b", "fine"));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vaultsync"));
    cmd.args(["--config", cfg.to_str().unwrap(), "check"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2 of 2 notes are published"))
        .stdout(predicate::str::contains("a.md (1 unresolved)"))
        .stdout(predicate::str::contains("[[missing]]"))
        .stdout(predicate::str::contains("[[b]]").not());

    assert!(!root.join("out").exists());
}

#[test]
fn check_fails_on_ambiguous_names() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let cfg = write_config(root);
    write_file(&root.join("vault/x/foo.md"), &published("x-foo", ""));
    write_file(&root.join("vault/y/foo.md"), &published("y-foo", ""));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vaultsync"));
    cmd.args(["--config", cfg.to_str().unwrap(), "check"]);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Ambiguous [[foo]]"))
        .stdout(predicate::str::contains("* x/foo.md"));
}

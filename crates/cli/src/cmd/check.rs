//! Read-only report on link health.

use std::path::Path;

use tracing_subscriber::filter::LevelFilter;
use vaultsync_core::resolve::unresolved_links;

pub fn run(config: Option<&Path>, profile: Option<&str>, level: Option<LevelFilter>) {
    let (_rc, mut sync) = super::prepare(config, profile, level);

    let report = match sync.build_index() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error reading vault: {}", e);
            std::process::exit(1);
        }
    };

    println!("{} of {} notes are published", report.notes_indexed, report.files_found);

    for collision in &report.collisions {
        println!();
        println!("Ambiguous [[{}]]:", collision.short_title);
        for (i, path) in collision.paths.iter().enumerate() {
            let marker = if i == 0 { "*" } else { " " };
            println!("  {} {}", marker, path.display());
        }
    }

    let index = sync.index();
    let mut unresolved = 0;
    for note in index.all() {
        let missing = unresolved_links(note, index);
        if missing.is_empty() {
            continue;
        }
        println!();
        println!("{} ({} unresolved):", note.vault_path.display(), missing.len());
        for target in missing {
            println!("  [[{}]]", target);
        }
        unresolved += 1;
    }

    println!();
    println!(
        "{} ambiguous names, {} notes with unresolved links, {} unreadable files",
        report.collisions.len(),
        unresolved,
        report.failures.len()
    );

    if !report.collisions.is_empty() {
        std::process::exit(1);
    }
}

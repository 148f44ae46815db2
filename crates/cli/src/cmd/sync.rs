//! One-shot full sync.

use std::path::Path;

use tracing_subscriber::filter::LevelFilter;

pub fn run(config: Option<&Path>, profile: Option<&str>, level: Option<LevelFilter>) {
    let (rc, mut sync) = super::prepare(config, profile, level);

    let report = match sync.full_sync() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error during sync: {}", e);
            std::process::exit(1);
        }
    };

    println!("Sync complete:");
    println!("  Files found:    {}", report.files_found);
    println!("  Notes indexed:  {}", report.notes_indexed);
    println!("  Notes written:  {}", report.notes_written);
    println!("  Images copied:  {}", report.images_copied);
    if !report.collisions.is_empty() {
        println!("  Ambiguous:      {}", report.collisions.len());
    }
    println!("Output: {}", rc.notes_dir.display());

    if !report.failures.is_empty() {
        eprintln!();
        eprintln!("{} file(s) failed:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}", failure);
        }
        std::process::exit(1);
    }
}

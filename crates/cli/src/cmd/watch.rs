//! Full sync followed by the watch loop.

use std::path::Path;

use tracing_subscriber::filter::LevelFilter;
use vaultsync_core::sync::VaultWatcher;

pub fn run(config: Option<&Path>, profile: Option<&str>, level: Option<LevelFilter>) {
    let (rc, mut sync) = super::prepare(config, profile, level);

    // The watcher must not start before the index is complete
    if let Err(e) = sync.full_sync() {
        eprintln!("Error during initial sync: {}", e);
        std::process::exit(1);
    }

    let watcher = match VaultWatcher::start(sync.watch_root(), rc.watch.debounce()) {
        Ok(watcher) => watcher,
        Err(e) => {
            eprintln!("Error starting watcher: {}", e);
            std::process::exit(1);
        }
    };

    let handled = sync.watch(watcher);
    tracing::info!("Watcher stopped after {} events", handled);
}

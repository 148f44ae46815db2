pub mod check;
pub mod doctor;
pub mod sync;
pub mod watch;

use std::path::Path;

use tracing_subscriber::filter::LevelFilter;
use vaultsync_core::config::loader::ConfigLoader;
use vaultsync_core::config::types::ResolvedConfig;
use vaultsync_core::sync::SyncOrchestrator;

use crate::logging;

/// Load the configuration, install logging and build the orchestrator.
///
/// Exits the process when either step fails.
fn prepare(
    config: Option<&Path>,
    profile: Option<&str>,
    level: Option<LevelFilter>,
) -> (ResolvedConfig, SyncOrchestrator) {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&rc.logging, level);

    let sync = match SyncOrchestrator::new(&rc) {
        Ok(sync) => sync,
        Err(e) => {
            eprintln!("Error opening vault: {}", e);
            std::process::exit(1);
        }
    };

    (rc, sync)
}

//! Vault to output synchronization.
//!
//! A [`SyncOrchestrator`] performs one full sync at startup (index, publish,
//! copy images) and then applies change events from a [`VaultWatcher`] one at
//! a time:
//!
//! ```no_run
//! use vaultsync_core::config::ConfigLoader;
//! use vaultsync_core::sync::{SyncOrchestrator, VaultWatcher};
//!
//! let config = ConfigLoader::load(None, None).unwrap();
//! let mut sync = SyncOrchestrator::new(&config).unwrap();
//! sync.full_sync().unwrap();
//!
//! let watcher = VaultWatcher::start(sync.watch_root(), config.watch.debounce()).unwrap();
//! sync.watch(watcher);
//! ```

pub mod error;
pub mod orchestrator;
pub mod watch;
pub mod writer;

pub use error::SyncError;
pub use orchestrator::{SyncOrchestrator, SyncReport, SyncState, UpdateOutcome};
pub use watch::{ChangeEvent, Coalescer, VaultWatcher, change_events};
pub use writer::OutputWriter;

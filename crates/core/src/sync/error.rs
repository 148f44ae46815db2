use std::path::PathBuf;

use thiserror::Error;

use crate::vault::VaultWalkerError;

/// Failure of one sync operation.
///
/// Every variant except `Walk` and `Watch` concerns a single file and is
/// recoverable: callers log it and move on to the next file.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to write {note}: {target} is not inside the output directory")]
    OutsideOutput { note: PathBuf, target: PathBuf },

    #[error("vault walker error: {0}")]
    Walk(#[from] VaultWalkerError),

    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

impl SyncError {
    /// Whether the error is limited to one file.
    pub fn is_per_file(&self) -> bool {
        !matches!(self, Self::Walk(_) | Self::Watch { .. })
    }
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    /// Root of the note vault.
    pub vault_root: String,
    /// Output content root; notes land in `<notes_dir>/<collection>/<slug>.md`.
    pub notes_dir: String,
    /// Output asset directory; images are copied flat into it.
    pub images_dir: String,
    /// Folders to skip (relative to vault_root).
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchConfig {
    /// Quiet period before a burst of events for one path is handled.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms() }
    }
}

fn default_debounce_ms() -> u64 {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub vault_root: PathBuf,
    pub notes_dir: PathBuf,
    pub images_dir: PathBuf,
    /// Folders to skip, relative to vault_root.
    pub excluded_folders: Vec<PathBuf>,
    pub watch: WatchConfig,
    pub logging: LoggingConfig,
}

impl ResolvedConfig {
    /// Last path segment of `images_dir`, used in relative asset links.
    pub fn asset_dir_name(&self) -> String {
        self.images_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

use std::path::Path;

use vaultsync_core::config::loader::{ConfigLoader, default_config_path};

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            println!("OK   vaultsync doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("vault_root: {}", rc.vault_root.display());
            println!("notes_dir: {}", rc.notes_dir.display());
            println!("images_dir: {}", rc.images_dir.display());
            // One ../ per collection segment plus one for the content root
            let dir = rc.asset_dir_name();
            println!(
                "asset links: ../../{dir}/<image> from collection \"a\", \
                 ../../../{dir}/<image> from \"a/b\""
            );
            for folder in &rc.excluded_folders {
                println!("excluded: {}", folder.display());
            }
            println!("watch.debounce_ms: {}", rc.watch.debounce_ms);

            if !rc.vault_root.is_dir() {
                println!("WARN vault_root is not a directory");
            }
        }
        Err(e) => {
            println!("FAIL vaultsync doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}

use crate::kernel::services::ports::settings::Settings;
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = ".scrollmark";
const SETTINGS_FILE: &str = "settings.json";

pub fn get_settings_path(vault_root: &Path) -> PathBuf {
    vault_root.join(SETTINGS_DIR).join(SETTINGS_FILE)
}

pub fn ensure_settings_file(vault_root: &Path) -> std::io::Result<PathBuf> {
    let path = get_settings_path(vault_root);
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content =
            serde_json::to_string_pretty(&Settings::default()).unwrap_or_else(|_| "{}".to_string());
        std::fs::write(&path, content)?;
    }
    Ok(path)
}

/// Read and normalize the settings file. `None` when it is missing or malformed.
pub fn load_settings(vault_root: &Path) -> Option<Settings> {
    let path = get_settings_path(vault_root);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => Some(settings.normalized()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings file");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;

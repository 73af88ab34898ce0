use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_FILE_NAME: &str = ".scrollmark/scroll-positions.json";
pub const DEFAULT_DELAY_AFTER_FILE_OPENING_MS: u64 = 100;
pub const MAX_DELAY_AFTER_FILE_OPENING_MS: u64 = 300;
pub const DEFAULT_SAVE_TIMER_MS: u64 = 5000;
pub const MIN_SAVE_TIMER_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Store file, relative to the vault root.
    #[serde(default = "default_db_file_name")]
    pub db_file_name: String,
    /// Milliseconds to wait after a document opens before restoring (0-300).
    #[serde(default = "default_delay_after_file_opening")]
    pub delay_after_file_opening: u64,
    /// Flush interval in milliseconds (at least 5000).
    #[serde(default = "default_save_timer")]
    pub save_timer: u64,
}

fn default_db_file_name() -> String {
    DEFAULT_DB_FILE_NAME.to_string()
}

fn default_delay_after_file_opening() -> u64 {
    DEFAULT_DELAY_AFTER_FILE_OPENING_MS
}

fn default_save_timer() -> u64 {
    DEFAULT_SAVE_TIMER_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_file_name: default_db_file_name(),
            delay_after_file_opening: DEFAULT_DELAY_AFTER_FILE_OPENING_MS,
            save_timer: DEFAULT_SAVE_TIMER_MS,
        }
    }
}

impl Settings {
    /// Clamp every option into its accepted range.
    pub fn normalized(mut self) -> Self {
        if self.db_file_name.trim().is_empty() {
            self.db_file_name = default_db_file_name();
        }
        self.delay_after_file_opening = self
            .delay_after_file_opening
            .min(MAX_DELAY_AFTER_FILE_OPENING_MS);
        self.save_timer = self.save_timer.max(MIN_SAVE_TIMER_MS);
        self
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(self.db_file_name.trim())
    }

    /// Expects normalized settings; see [`Settings::normalized`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.delay_after_file_opening)
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_millis(self.save_timer)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;

//! Service adapters: OS specific implementations.

pub mod file_watcher;
pub mod paths;
pub mod settings;
pub mod store;

pub use file_watcher::{VaultChange, VaultWatcher};
pub use paths::{ensure_log_dir, get_log_dir};
pub use settings::{ensure_settings_file, get_settings_path, load_settings};
pub use store::LocalStateStore;

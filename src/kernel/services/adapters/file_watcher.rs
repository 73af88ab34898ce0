//! Vault watcher: reports document renames and deletions made outside the host.

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultChange {
    Renamed { from: String, to: String },
    Deleted { path: String },
}

pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl VaultWatcher {
    pub fn start<F>(root: &Path, on_change: F) -> Result<Self, notify::Error>
    where
        F: Fn(VaultChange) + Send + 'static,
    {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let event_root = root.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "vault watcher error");
                        return;
                    }
                };
                for change in normalize_notify_event(&event, &event_root) {
                    on_change(change);
                }
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        tracing::info!(root = %root.display(), "watching vault");
        Ok(Self {
            _watcher: watcher,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Only paired renames count. A lone rename half would look like a delete and
/// drop the entry before the matching half could move it.
pub fn normalize_notify_event(event: &notify::Event, root: &Path) -> Vec<VaultChange> {
    match event.kind {
        EventKind::Remove(_) => event
            .paths
            .iter()
            .filter_map(|path| document_path(root, path))
            .map(|path| VaultChange::Deleted { path })
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
            match (
                document_path(root, &event.paths[0]),
                document_path(root, &event.paths[1]),
            ) {
                (Some(from), Some(to)) => vec![VaultChange::Renamed { from, to }],
                // Moved out of the vault.
                (Some(from), None) => vec![VaultChange::Deleted { path: from }],
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Vault-relative, `/`-separated document path.
pub fn document_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/file_watcher.rs"]
mod tests;

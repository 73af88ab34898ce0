//! Local filesystem store. Paths are resolved against the vault root.

use std::fs;
use std::path::{Path, PathBuf};

use crate::kernel::services::ports::store::{Result, StateStore, StoreError};

pub struct LocalStateStore {
    root: PathBuf,
}

impl LocalStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(StoreError::InvalidPath(String::new()));
        }
        Ok(self.root.join(path))
    }
}

impl StateStore for LocalStateStore {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(StoreError::NotFound(full));
        }
        Ok(fs::read(full)?)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        Ok(fs::write(full, bytes)?)
    }

    fn mkdir(&self, path: &Path) -> Result<()> {
        let full = self.resolve(path)?;
        Ok(fs::create_dir_all(full)?)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/store.rs"]
mod tests;
